use crate::domain::market::interval::Interval;
use crate::domain::market::symbol::{Exchange, generate_vt_symbol};
use chrono::{NaiveDateTime, Timelike};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// OHLCV bar.
///
/// `datetime` marks the start of the interval. `volume` is the traded volume
/// inside the interval, `open_interest` is the last observed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub symbol: String,
    pub exchange: Exchange,
    pub datetime: NaiveDateTime,
    pub interval: Interval,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    pub open_interest: Decimal,
}

impl Bar {
    /// Creates a bar whose prices all equal `price`, with zero volume
    pub fn seeded(
        symbol: impl Into<String>,
        exchange: Exchange,
        datetime: NaiveDateTime,
        interval: Interval,
        price: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            exchange,
            datetime,
            interval,
            open: price,
            high: price,
            low: price,
            close: price,
            volume: Decimal::ZERO,
            open_interest: Decimal::ZERO,
        }
    }

    pub fn vt_symbol(&self) -> String {
        generate_vt_symbol(&self.symbol, self.exchange)
    }

    /// Widens high/low to include the given extremes
    pub fn extend_range(&mut self, high: Decimal, low: Decimal) {
        self.high = self.high.max(high);
        self.low = self.low.min(low);
    }
}

/// Zeroes seconds and sub-second precision
pub fn truncate_to_minute(dt: NaiveDateTime) -> NaiveDateTime {
    dt.with_second(0)
        .and_then(|d| d.with_nanosecond(0))
        .unwrap_or(dt)
}

/// Zeroes minutes, seconds and sub-second precision
pub fn truncate_to_hour(dt: NaiveDateTime) -> NaiveDateTime {
    truncate_to_minute(dt).with_minute(0).unwrap_or(dt)
}
