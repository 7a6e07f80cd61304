use crate::application::market_data::bar_generator::BarGenerator;
use crate::application::market_data::window::WindowSpec;
use crate::domain::errors::BufferError;
use crate::domain::market::bar::Bar;
use crate::domain::market::products::is_trading_time;
use crate::domain::market::rolling_buffer::RollingBuffer;
use crate::domain::market::tick::Tick;
use crate::domain::ports::BarCallback;
use crossbeam_channel::{Receiver, Sender, unbounded};
use tracing::trace;

/// Bar emitted while processing one input
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// Completed 1-minute bar
    Minute(Bar),
    /// Completed window bar built from 1-minute bars
    Window(Bar),
}

impl PipelineEvent {
    pub fn bar(&self) -> &Bar {
        match self {
            PipelineEvent::Minute(bar) | PipelineEvent::Window(bar) => bar,
        }
    }
}

/// Pipeline settings for one instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub window: Option<WindowSpec>,
    pub buffer_size: usize,
    /// Drop ticks outside the product's trading sessions
    pub session_filter: bool,
}

fn channel_callback(tx: Sender<Bar>) -> BarCallback {
    Box::new(move |bar: Bar| {
        // The receiver lives as long as the pipeline that owns the callback
        let _ = tx.send(bar);
    })
}

/// Per-instrument chain: tick → 1-minute bar → optional window bar → rolling buffer.
///
/// The generators hand completed bars to channel-backed callbacks; the
/// pipeline drains those channels before returning, so every input is fully
/// processed synchronously.
pub struct BarPipeline {
    vt_symbol: String,
    session_filter: bool,
    minute: BarGenerator,
    minute_rx: Receiver<Bar>,
    window: Option<(BarGenerator, Receiver<Bar>)>,
    buffer: RollingBuffer,
    last_bar: Option<Bar>,
    last_window_bar: Option<Bar>,
}

impl BarPipeline {
    pub fn new(vt_symbol: impl Into<String>, config: PipelineConfig) -> Result<Self, BufferError> {
        let buffer = RollingBuffer::new(config.buffer_size)?;

        let (minute_tx, minute_rx) = unbounded();
        let minute = BarGenerator::new(channel_callback(minute_tx));

        let window = config.window.map(|spec| {
            let (window_tx, window_rx) = unbounded();
            (
                BarGenerator::window_only(spec, channel_callback(window_tx)),
                window_rx,
            )
        });

        Ok(Self {
            vt_symbol: vt_symbol.into(),
            session_filter: config.session_filter,
            minute,
            minute_rx,
            window,
            buffer,
            last_bar: None,
            last_window_bar: None,
        })
    }

    pub fn on_tick(&mut self, tick: &Tick) -> Vec<PipelineEvent> {
        if self.session_filter && !is_trading_time(&self.vt_symbol, tick.datetime.time()) {
            trace!(
                "BarPipeline: {} dropped off-session tick at {}",
                self.vt_symbol, tick.datetime
            );
            return Vec::new();
        }
        self.minute.update_tick(tick);
        self.drain()
    }

    /// Feeds an already-built 1-minute bar, bypassing tick aggregation
    pub fn on_bar(&mut self, bar: &Bar) -> Vec<PipelineEvent> {
        let mut events = Vec::new();
        self.route_minute_bar(bar.clone(), &mut events);
        events
    }

    /// Forces out partial bars: the 1-minute bar first, then the window bar
    pub fn flush(&mut self) -> Vec<PipelineEvent> {
        self.minute.generate();
        let mut events = self.drain();
        if let Some((generator, _)) = self.window.as_mut() {
            generator.flush_window();
        }
        self.drain_window(&mut events);
        events
    }

    fn drain(&mut self) -> Vec<PipelineEvent> {
        let mut events = Vec::new();
        while let Ok(bar) = self.minute_rx.try_recv() {
            self.route_minute_bar(bar, &mut events);
        }
        events
    }

    fn route_minute_bar(&mut self, bar: Bar, events: &mut Vec<PipelineEvent>) {
        match self.window.as_mut() {
            Some((generator, _)) => generator.update_bar(&bar),
            None => self.buffer.update(&bar),
        }
        self.last_bar = Some(bar.clone());
        events.push(PipelineEvent::Minute(bar));
        self.drain_window(events);
    }

    fn drain_window(&mut self, events: &mut Vec<PipelineEvent>) {
        let Some((_, window_rx)) = self.window.as_ref() else {
            return;
        };
        let completed: Vec<Bar> = window_rx.try_iter().collect();
        for bar in completed {
            self.buffer.update(&bar);
            self.last_window_bar = Some(bar.clone());
            events.push(PipelineEvent::Window(bar));
        }
    }

    pub fn vt_symbol(&self) -> &str {
        &self.vt_symbol
    }

    /// History fed by the last stage of the pipeline
    pub fn buffer(&self) -> &RollingBuffer {
        &self.buffer
    }

    pub fn last_bar(&self) -> Option<&Bar> {
        self.last_bar.as_ref()
    }

    pub fn last_window_bar(&self) -> Option<&Bar> {
        self.last_window_bar.as_ref()
    }

    pub fn current_bar(&self) -> Option<&Bar> {
        self.minute.current_bar()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::symbol::Exchange;
    use chrono::{NaiveDate, NaiveDateTime};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn tick(h: u32, m: u32, s: u32, price: Decimal) -> Tick {
        Tick::new("rb2105", Exchange::Shfe, at(h, m, s), price)
    }

    fn config(window: Option<WindowSpec>) -> PipelineConfig {
        PipelineConfig {
            window,
            buffer_size: 3,
            session_filter: false,
        }
    }

    #[test]
    fn test_zero_buffer_rejected() {
        let cfg = PipelineConfig {
            window: None,
            buffer_size: 0,
            session_filter: false,
        };
        assert!(BarPipeline::new("rb2105.SHFE", cfg).is_err());
    }

    #[test]
    fn test_minute_bars_feed_buffer_without_window() {
        let mut pipeline = BarPipeline::new("rb2105.SHFE", config(None)).unwrap();

        assert!(pipeline.on_tick(&tick(9, 30, 0, dec!(100))).is_empty());
        let events = pipeline.on_tick(&tick(9, 31, 0, dec!(101)));
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], PipelineEvent::Minute(_)));
        assert_eq!(pipeline.buffer().count(), 1);
        assert_eq!(pipeline.buffer().close()[2], 100.0);
        assert_eq!(pipeline.last_bar().unwrap().close, dec!(100));
    }

    #[test]
    fn test_window_bars_feed_buffer() {
        let mut pipeline =
            BarPipeline::new("rb2105.SHFE", config(Some(WindowSpec::minutes(2).unwrap()))).unwrap();

        pipeline.on_tick(&tick(9, 0, 0, dec!(100)));
        pipeline.on_tick(&tick(9, 1, 0, dec!(101)));
        // 9:01 bar completes the 2-minute window
        let events = pipeline.on_tick(&tick(9, 2, 0, dec!(102)));

        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], PipelineEvent::Minute(_)));
        assert!(matches!(events[1], PipelineEvent::Window(_)));
        let window = events[1].bar();
        assert_eq!(window.open, dec!(100));
        assert_eq!(window.close, dec!(101));
        assert_eq!(pipeline.buffer().count(), 1);
        assert_eq!(pipeline.last_window_bar(), Some(window));
    }

    #[test]
    fn test_flush_emits_partial_bars_once() {
        let mut pipeline =
            BarPipeline::new("rb2105.SHFE", config(Some(WindowSpec::minutes(5).unwrap()))).unwrap();

        assert!(pipeline.flush().is_empty());
        pipeline.on_tick(&tick(9, 0, 0, dec!(100)));
        pipeline.on_tick(&tick(9, 0, 30, dec!(99)));

        let events = pipeline.flush();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].bar().datetime, at(9, 0, 0));
        assert!(matches!(events[1], PipelineEvent::Window(_)));
        assert!(pipeline.flush().is_empty());
        assert!(pipeline.current_bar().is_none());
    }

    #[test]
    fn test_session_filter_drops_off_hours_ticks() {
        let cfg = PipelineConfig {
            window: None,
            buffer_size: 3,
            session_filter: true,
        };
        let mut pipeline = BarPipeline::new("rb2105.SHFE", cfg).unwrap();

        pipeline.on_tick(&tick(8, 55, 0, dec!(100)));
        assert!(pipeline.current_bar().is_none());
        pipeline.on_tick(&tick(9, 5, 0, dec!(100)));
        assert!(pipeline.current_bar().is_some());
    }

    #[test]
    fn test_on_bar_routes_prebuilt_bars() {
        let mut pipeline =
            BarPipeline::new("rb2105.SHFE", config(Some(WindowSpec::minutes(5).unwrap()))).unwrap();
        let mut events = Vec::new();
        for m in 0..5 {
            let bar = crate::domain::market::bar::Bar::seeded(
                "rb2105",
                Exchange::Shfe,
                at(9, m, 0),
                crate::domain::market::interval::Interval::Minute,
                dec!(100),
            );
            events.extend(pipeline.on_bar(&bar));
        }
        assert_eq!(events.len(), 6);
        assert!(matches!(events[5], PipelineEvent::Window(_)));
    }
}
