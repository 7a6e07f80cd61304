use crate::application::market_data::window::{
    WindowSpec, bar_window_finished, tick_window_finished,
};
use crate::domain::market::bar::{Bar, truncate_to_hour, truncate_to_minute};
use crate::domain::market::interval::Interval;
use crate::domain::market::tick::Tick;
use crate::domain::ports::BarCallback;
use chrono::Timelike;
use rust_decimal::Decimal;
use tracing::{debug, trace};

/// In-progress window bar and its completion bookkeeping
struct WindowState {
    spec: WindowSpec,
    bar: Option<Bar>,
    /// Hour changes seen since the last completed multi-hour window
    interval_count: u32,
    on_window_bar: BarCallback,
    last_window_bar: Option<Bar>,
}

impl WindowState {
    fn emit(&mut self, bar: Bar) {
        debug!(
            "BarGenerator: {} {}{} window bar completed → O:{} H:{} L:{} C:{} V:{}",
            bar.vt_symbol(),
            self.spec.window(),
            self.spec.interval(),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume
        );
        self.last_window_bar = Some(bar.clone());
        (self.on_window_bar)(bar);
    }
}

/// Builds 1-minute bars from ticks and, optionally, window bars from ticks
/// or from 1-minute bars.
///
/// Completion is only ever detected when the next input arrives; there are no
/// timers. Use [`BarGenerator::generate`] to force out a partial bar at the
/// end of a session.
pub struct BarGenerator {
    bar: Option<Bar>,
    on_bar: BarCallback,
    window: Option<WindowState>,
    last_tick: Option<Tick>,
    last_bar: Option<Bar>,
}

impl BarGenerator {
    /// Generator producing 1-minute bars only
    pub fn new(on_bar: BarCallback) -> Self {
        Self {
            bar: None,
            on_bar,
            window: None,
            last_tick: None,
            last_bar: None,
        }
    }

    /// Generator producing 1-minute bars plus `spec`-sized window bars
    pub fn with_window(on_bar: BarCallback, spec: WindowSpec, on_window_bar: BarCallback) -> Self {
        let mut generator = Self::new(on_bar);
        generator.window = Some(WindowState {
            spec,
            bar: None,
            interval_count: 0,
            on_window_bar,
            last_window_bar: None,
        });
        generator
    }

    /// Generator fed with 1-minute bars through [`BarGenerator::update_bar`]
    pub fn window_only(spec: WindowSpec, on_window_bar: BarCallback) -> Self {
        Self::with_window(Box::new(|_: Bar| {}), spec, on_window_bar)
    }

    /// Feeds a tick.
    ///
    /// Ticks with a non-positive last price, or stamped earlier than the last
    /// accepted tick, are dropped without touching any state.
    pub fn update_tick(&mut self, tick: &Tick) {
        if tick.last_price <= Decimal::ZERO {
            trace!(
                "BarGenerator: {} dropped tick with last price {}",
                tick.vt_symbol(),
                tick.last_price
            );
            return;
        }

        if let Some(prev) = &self.last_tick
            && tick.datetime < prev.datetime
        {
            debug!(
                "BarGenerator: {} dropped out-of-order tick {} (last {})",
                tick.vt_symbol(),
                tick.datetime,
                prev.datetime
            );
            return;
        }

        let new_minute = match &self.bar {
            None => true,
            Some(bar) => {
                bar.datetime.minute() != tick.datetime.minute()
                    || bar.datetime.hour() != tick.datetime.hour()
            }
        };

        if new_minute {
            if let Some(mut finished) = self.bar.take() {
                finished.datetime = truncate_to_minute(finished.datetime);
                self.emit(finished);
            }

            let mut bar = Bar::seeded(
                tick.symbol.clone(),
                tick.exchange,
                tick.datetime,
                Interval::Minute,
                tick.last_price,
            );
            bar.open_interest = tick.open_interest;
            self.bar = Some(bar);
        } else if let Some(bar) = self.bar.as_mut() {
            bar.extend_range(tick.last_price, tick.last_price);

            // The venue's running high/low can catch swings between ticks
            if let Some(prev) = &self.last_tick {
                if tick.high_price > prev.high_price {
                    bar.high = bar.high.max(tick.high_price);
                }
                if tick.low_price > Decimal::ZERO && tick.low_price < prev.low_price {
                    bar.low = bar.low.min(tick.low_price);
                }
            }

            bar.close = tick.last_price;
            bar.open_interest = tick.open_interest;
            bar.datetime = tick.datetime;
        }

        if let (Some(prev), Some(bar)) = (&self.last_tick, self.bar.as_mut()) {
            bar.volume += (tick.volume - prev.volume).max(Decimal::ZERO);
        }

        if let Some(window) = self.window.as_mut() {
            Self::update_window_from_tick(window, tick, self.last_tick.as_ref());
        }

        self.last_tick = Some(tick.clone());
    }

    fn update_window_from_tick(window: &mut WindowState, tick: &Tick, prev: Option<&Tick>) {
        match window.bar.as_mut() {
            None => {
                window.bar = Some(Bar::seeded(
                    tick.symbol.clone(),
                    tick.exchange,
                    truncate_to_minute(tick.datetime),
                    window.spec.interval(),
                    tick.last_price,
                ));
            }
            Some(bar) => bar.extend_range(tick.last_price, tick.last_price),
        }

        if let Some(bar) = window.bar.as_mut() {
            bar.close = tick.last_price;
            // Raw copy of the cumulative counter, not a delta
            bar.volume = tick.volume.trunc();
            bar.open_interest = tick.open_interest;
        }

        if tick_window_finished(window.spec, &mut window.interval_count, tick, prev)
            && let Some(bar) = window.bar.take()
        {
            window.emit(bar);
        }
    }

    /// Feeds a completed 1-minute bar into the window bar.
    ///
    /// Does nothing on a generator built without a window.
    pub fn update_bar(&mut self, bar: &Bar) {
        let Some(window) = self.window.as_mut() else {
            trace!(
                "BarGenerator: {} bar ignored, no window configured",
                bar.vt_symbol()
            );
            return;
        };

        match window.bar.as_mut() {
            None => {
                let datetime = match window.spec.interval() {
                    Interval::Hour => truncate_to_hour(bar.datetime),
                    _ => truncate_to_minute(bar.datetime),
                };
                let mut seeded = Bar::seeded(
                    bar.symbol.clone(),
                    bar.exchange,
                    datetime,
                    window.spec.interval(),
                    bar.open,
                );
                seeded.high = bar.high;
                seeded.low = bar.low;
                window.bar = Some(seeded);
            }
            Some(current) => current.extend_range(bar.high, bar.low),
        }

        if let Some(current) = window.bar.as_mut() {
            current.close = bar.close;
            current.volume += bar.volume.trunc();
            current.open_interest = bar.open_interest;
        }

        if bar_window_finished(
            window.spec,
            &mut window.interval_count,
            bar,
            self.last_bar.as_ref(),
        ) && let Some(finished) = window.bar.take()
        {
            window.emit(finished);
        }

        self.last_bar = Some(bar.clone());
    }

    /// Emits the in-progress 1-minute bar, if any, and clears it.
    ///
    /// Unlike tick-driven completion this does not wait for a boundary.
    pub fn generate(&mut self) -> Option<Bar> {
        let mut bar = self.bar.take()?;
        bar.datetime = truncate_to_minute(bar.datetime);
        self.emit(bar.clone());
        Some(bar)
    }

    /// Emits the in-progress window bar, if any, and restarts window counting.
    pub fn flush_window(&mut self) -> Option<Bar> {
        let window = self.window.as_mut()?;
        let bar = window.bar.take()?;
        window.interval_count = 0;
        window.emit(bar.clone());
        Some(bar)
    }

    fn emit(&mut self, bar: Bar) {
        debug!(
            "BarGenerator: {} bar completed → O:{} H:{} L:{} C:{} V:{}",
            bar.vt_symbol(),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume
        );
        (self.on_bar)(bar);
    }

    /// 1-minute bar currently being built
    pub fn current_bar(&self) -> Option<&Bar> {
        self.bar.as_ref()
    }

    pub fn current_window_bar(&self) -> Option<&Bar> {
        self.window.as_ref()?.bar.as_ref()
    }

    pub fn last_window_bar(&self) -> Option<&Bar> {
        self.window.as_ref()?.last_window_bar.as_ref()
    }

    pub fn window_spec(&self) -> Option<WindowSpec> {
        self.window.as_ref().map(|w| w.spec)
    }

    pub fn last_tick(&self) -> Option<&Tick> {
        self.last_tick.as_ref()
    }
}
