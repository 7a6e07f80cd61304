use crate::domain::market::symbol::{Exchange, generate_vt_symbol};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Depth of the bid/ask ladder carried by every tick
pub const BOOK_DEPTH: usize = 5;

/// One level of the order book snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BookLevel {
    pub bid_price: Decimal,
    pub bid_volume: Decimal,
    pub ask_price: Decimal,
    pub ask_volume: Decimal,
}

/// Market quote update.
///
/// `volume` is the cumulative traded volume of the session and `high_price` /
/// `low_price` are the session extremes reported by the venue. The book ladder
/// is pass-through context and never touched by aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub symbol: String,
    pub exchange: Exchange,
    /// Exchange-local wall clock
    pub datetime: NaiveDateTime,
    pub name: String,

    pub last_price: Decimal,
    pub last_volume: Decimal,
    pub volume: Decimal,
    pub open_interest: Decimal,
    pub limit_up: Decimal,
    pub limit_down: Decimal,

    pub open_price: Decimal,
    pub high_price: Decimal,
    pub low_price: Decimal,
    pub pre_close: Decimal,

    pub depth: [BookLevel; BOOK_DEPTH],
}

impl Tick {
    /// Creates a tick with every numeric field other than `last_price` zeroed
    pub fn new(
        symbol: impl Into<String>,
        exchange: Exchange,
        datetime: NaiveDateTime,
        last_price: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            exchange,
            datetime,
            name: String::new(),
            last_price,
            last_volume: Decimal::ZERO,
            volume: Decimal::ZERO,
            open_interest: Decimal::ZERO,
            limit_up: Decimal::ZERO,
            limit_down: Decimal::ZERO,
            open_price: Decimal::ZERO,
            high_price: Decimal::ZERO,
            low_price: Decimal::ZERO,
            pre_close: Decimal::ZERO,
            depth: [BookLevel::default(); BOOK_DEPTH],
        }
    }

    pub fn with_volume(mut self, volume: Decimal) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_open_interest(mut self, open_interest: Decimal) -> Self {
        self.open_interest = open_interest;
        self
    }

    /// Sets the venue-reported session high/low
    pub fn with_range(mut self, high_price: Decimal, low_price: Decimal) -> Self {
        self.high_price = high_price;
        self.low_price = low_price;
        self
    }

    pub fn vt_symbol(&self) -> String {
        generate_vt_symbol(&self.symbol, self.exchange)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_builder_fields() {
        let dt = NaiveDate::from_ymd_opt(2021, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let tick = Tick::new("rb2105", Exchange::Shfe, dt, dec!(4500))
            .with_volume(dec!(120))
            .with_open_interest(dec!(3000))
            .with_range(dec!(4510), dec!(4490));

        assert_eq!(tick.vt_symbol(), "rb2105.SHFE");
        assert_eq!(tick.volume, dec!(120));
        assert_eq!(tick.open_interest, dec!(3000));
        assert_eq!(tick.high_price, dec!(4510));
        assert_eq!(tick.low_price, dec!(4490));
        assert_eq!(tick.depth[4], BookLevel::default());
    }
}
