use crate::application::market_data::pipeline::{BarPipeline, PipelineConfig, PipelineEvent};
use crate::domain::errors::EngineError;
use crate::domain::market::bar::Bar;
use crate::domain::market::symbol::extract_vt_symbol;
use crate::domain::market::tick::Tick;
use crate::domain::ports::Strategy;
use crate::domain::trading::types::{Order, Trade};
use crossbeam_channel::Sender;
use std::collections::BTreeMap;
use tracing::{debug, info, trace, warn};

struct Slot {
    pipeline: BarPipeline,
    strategy: Box<dyn Strategy>,
}

/// Routes market data and order updates to one strategy per instrument.
///
/// Every vt_symbol owns an independent [`BarPipeline`]; nothing is shared
/// between instruments. Completed 1-minute bars are also forwarded to an
/// optional recorder channel.
pub struct StrategyEngine {
    config: PipelineConfig,
    slots: BTreeMap<String, Slot>,
    recorder: Option<Sender<Bar>>,
}

impl StrategyEngine {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            slots: BTreeMap::new(),
            recorder: None,
        }
    }

    /// Forwards every completed 1-minute bar to `recorder`
    pub fn with_recorder(mut self, recorder: Sender<Bar>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn add_strategy(
        &mut self,
        vt_symbol: &str,
        strategy: Box<dyn Strategy>,
    ) -> Result<(), EngineError> {
        extract_vt_symbol(vt_symbol)?;
        if self.slots.contains_key(vt_symbol) {
            return Err(EngineError::DuplicateSymbol {
                vt_symbol: vt_symbol.to_string(),
            });
        }

        let pipeline = BarPipeline::new(vt_symbol, self.config)?;
        info!(
            "StrategyEngine: {} attached to {} (window: {:?}, buffer: {})",
            strategy.name(),
            vt_symbol,
            self.config.window,
            self.config.buffer_size
        );
        self.slots
            .insert(vt_symbol.to_string(), Slot { pipeline, strategy });
        Ok(())
    }

    pub fn on_tick(&mut self, tick: &Tick) -> Vec<PipelineEvent> {
        let vt_symbol = tick.vt_symbol();
        let Some(slot) = self.slots.get_mut(&vt_symbol) else {
            trace!("StrategyEngine: no strategy for {}, tick skipped", vt_symbol);
            return Vec::new();
        };

        slot.strategy.on_tick(tick);
        let events = slot.pipeline.on_tick(tick);
        self.dispatch(&vt_symbol, &events);
        events
    }

    /// Feeds a pre-built 1-minute bar, e.g. when replaying recorded history
    pub fn on_bar(&mut self, bar: &Bar) -> Vec<PipelineEvent> {
        let vt_symbol = bar.vt_symbol();
        let Some(slot) = self.slots.get_mut(&vt_symbol) else {
            trace!("StrategyEngine: no strategy for {}, bar skipped", vt_symbol);
            return Vec::new();
        };

        let events = slot.pipeline.on_bar(bar);
        self.dispatch(&vt_symbol, &events);
        events
    }

    pub fn on_order(&mut self, order: &Order) {
        match self.slots.get_mut(&order.vt_symbol) {
            Some(slot) => slot.strategy.on_order(order),
            None => debug!(
                "StrategyEngine: order {} for unknown {} ignored",
                order.id, order.vt_symbol
            ),
        }
    }

    pub fn on_trade(&mut self, trade: &Trade) {
        match self.slots.get_mut(&trade.vt_symbol) {
            Some(slot) => slot.strategy.on_trade(trade),
            None => debug!(
                "StrategyEngine: trade {} for unknown {} ignored",
                trade.id, trade.vt_symbol
            ),
        }
    }

    /// Flushes every pipeline, delivering partial bars to the strategies
    pub fn stop(&mut self) -> Vec<PipelineEvent> {
        let symbols: Vec<String> = self.slots.keys().cloned().collect();
        let mut flushed = Vec::new();
        for vt_symbol in symbols {
            let events = match self.slots.get_mut(&vt_symbol) {
                Some(slot) => slot.pipeline.flush(),
                None => continue,
            };
            self.dispatch(&vt_symbol, &events);
            flushed.extend(events);
        }
        info!(
            "StrategyEngine: stopped {} instrument(s), {} partial bar(s) flushed",
            self.slots.len(),
            flushed.len()
        );
        flushed
    }

    fn dispatch(&mut self, vt_symbol: &str, events: &[PipelineEvent]) {
        let windowed = self.config.window.is_some();

        for event in events {
            if let PipelineEvent::Minute(bar) = event {
                self.record(bar);
            }

            let feeds_history = matches!(
                (event, windowed),
                (PipelineEvent::Window(_), true) | (PipelineEvent::Minute(_), false)
            );
            if feeds_history && let Some(slot) = self.slots.get_mut(vt_symbol) {
                slot.strategy.on_bar(event.bar(), slot.pipeline.buffer());
            }
        }
    }

    fn record(&mut self, bar: &Bar) {
        let Some(recorder) = self.recorder.as_ref() else {
            return;
        };
        if let Err(e) = recorder.send(bar.clone()) {
            warn!(
                "StrategyEngine: recorder disconnected, bars no longer recorded: {}",
                e
            );
            self.recorder = None;
        }
    }

    pub fn pipeline(&self, vt_symbol: &str) -> Option<&BarPipeline> {
        self.slots.get(vt_symbol).map(|slot| &slot.pipeline)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }
}
