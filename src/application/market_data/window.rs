//! Window bar settings and completion rules.
//!
//! Tick-driven and bar-driven windows decide completion differently:
//!
//! - [`tick_window_finished`] compares the incoming tick against the previous
//!   tick and fires on a minute/hour change landing on a multiple of the
//!   window size.
//! - [`bar_window_finished`] looks only at the incoming bar's own minute for
//!   minute windows, and at hour changes or the `:59` bar for hour windows.

use crate::domain::errors::AggregationError;
use crate::domain::market::bar::Bar;
use crate::domain::market::interval::Interval;
use crate::domain::market::tick::Tick;
use chrono::Timelike;
use tracing::warn;

/// Size and unit of a window bar (e.g. 5 minutes, 2 hours)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpec {
    window: u32,
    interval: Interval,
}

impl WindowSpec {
    pub fn new(window: u32, interval: Interval) -> Result<Self, AggregationError> {
        if window == 0 {
            return Err(AggregationError::ZeroWindow);
        }
        if !interval.supports_window() {
            return Err(AggregationError::UnsupportedInterval { interval });
        }
        if interval == Interval::Minute && 60 % window != 0 {
            warn!(
                "WindowSpec: {}-minute window does not divide 60, windows will straddle hours",
                window
            );
        }
        Ok(Self { window, interval })
    }

    pub fn minutes(window: u32) -> Result<Self, AggregationError> {
        Self::new(window, Interval::Minute)
    }

    pub fn hours(window: u32) -> Result<Self, AggregationError> {
        Self::new(window, Interval::Hour)
    }

    pub fn window(&self) -> u32 {
        self.window
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }
}

/// Counts hour changes; completes every `window`-th one.
fn count_hour_change(window: u32, interval_count: &mut u32) -> bool {
    if window == 1 {
        return true;
    }
    *interval_count += 1;
    if *interval_count % window == 0 {
        *interval_count = 0;
        return true;
    }
    false
}

/// Completion rule for windows built directly from ticks.
///
/// Never fires without a previous tick to compare against.
pub fn tick_window_finished(
    spec: WindowSpec,
    interval_count: &mut u32,
    tick: &Tick,
    prev: Option<&Tick>,
) -> bool {
    let Some(prev) = prev else {
        return false;
    };
    let hour_change = tick.datetime.hour() != prev.datetime.hour();

    match spec.interval {
        Interval::Minute => {
            let minute_change = tick.datetime.minute() != prev.datetime.minute();
            (hour_change || minute_change) && tick.datetime.minute() % spec.window == 0
        }
        Interval::Hour => hour_change && count_hour_change(spec.window, interval_count),
        _ => false,
    }
}

/// Completion rule for windows re-aggregated from 1-minute bars.
///
/// Minute windows complete on `(minute + 1) % window == 0` regardless of the
/// previous bar. Hour windows complete on an hour change or a `:59` bar, and
/// need a previous bar.
pub fn bar_window_finished(
    spec: WindowSpec,
    interval_count: &mut u32,
    bar: &Bar,
    prev: Option<&Bar>,
) -> bool {
    match spec.interval {
        Interval::Minute => (bar.datetime.minute() + 1) % spec.window == 0,
        Interval::Hour => {
            let Some(prev) = prev else {
                return false;
            };
            let new_hour = bar.datetime.hour() != prev.datetime.hour();
            let last_minute = bar.datetime.minute() == 59;
            (new_hour || last_minute) && count_hour_change(spec.window, interval_count)
        }
        _ => false,
    }
}
