//! Technical indicators evaluated over a [`RollingBuffer`].
//!
//! Each function replays the whole buffer through a fresh `ta` indicator and
//! returns the value after the newest bar. Calling any of them before the
//! buffer is inited is an error, since the leading slots are zero padding.

use crate::domain::errors::IndicatorError;
use crate::domain::market::rolling_buffer::RollingBuffer;
use ta::Next;
use ta::indicators::{
    AverageTrueRange, BollingerBands, ExponentialMovingAverage, RelativeStrengthIndex,
    SimpleMovingAverage, StandardDeviation,
};

/// Bollinger band values after the newest bar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

fn check(buffer: &RollingBuffer, period: usize) -> Result<(), IndicatorError> {
    if !buffer.inited() {
        return Err(IndicatorError::NotInited {
            count: buffer.count(),
            capacity: buffer.capacity(),
        });
    }
    if period > buffer.capacity() {
        return Err(IndicatorError::PeriodTooLong {
            period,
            capacity: buffer.capacity(),
        });
    }
    Ok(())
}

fn last_output<I: Next<f64, Output = f64>>(mut indicator: I, values: &[f64]) -> f64 {
    values
        .iter()
        .fold(0.0, |_, value| indicator.next(*value))
}

pub fn sma(buffer: &RollingBuffer, period: usize) -> Result<f64, IndicatorError> {
    check(buffer, period)?;
    let indicator = SimpleMovingAverage::new(period)?;
    Ok(last_output(indicator, buffer.close()))
}

pub fn ema(buffer: &RollingBuffer, period: usize) -> Result<f64, IndicatorError> {
    check(buffer, period)?;
    let indicator = ExponentialMovingAverage::new(period)?;
    Ok(last_output(indicator, buffer.close()))
}

/// Population standard deviation of the last `period` closes
pub fn std(buffer: &RollingBuffer, period: usize) -> Result<f64, IndicatorError> {
    check(buffer, period)?;
    let indicator = StandardDeviation::new(period)?;
    Ok(last_output(indicator, buffer.close()))
}

pub fn rsi(buffer: &RollingBuffer, period: usize) -> Result<f64, IndicatorError> {
    check(buffer, period)?;
    let indicator = RelativeStrengthIndex::new(period)?;
    Ok(last_output(indicator, buffer.close()))
}

pub fn atr(buffer: &RollingBuffer, period: usize) -> Result<f64, IndicatorError> {
    check(buffer, period)?;
    let mut indicator = AverageTrueRange::new(period)?;

    let mut value = 0.0;
    for i in 0..buffer.capacity() {
        let item = ta::DataItem::builder()
            .open(buffer.open()[i])
            .high(buffer.high()[i])
            .low(buffer.low()[i])
            .close(buffer.close()[i])
            .volume(buffer.volume()[i])
            .build()?;
        value = indicator.next(&item);
    }
    Ok(value)
}

pub fn boll(buffer: &RollingBuffer, period: usize, dev: f64) -> Result<Bands, IndicatorError> {
    check(buffer, period)?;
    let mut indicator = BollingerBands::new(period, dev)?;

    let mut bands = Bands {
        upper: 0.0,
        middle: 0.0,
        lower: 0.0,
    };
    for close in buffer.close() {
        let out = indicator.next(*close);
        bands = Bands {
            upper: out.upper,
            middle: out.average,
            lower: out.lower,
        };
    }
    Ok(bands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::bar::Bar;
    use crate::domain::market::interval::Interval;
    use crate::domain::market::symbol::Exchange;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn filled(closes: &[i64]) -> RollingBuffer {
        let mut buffer = RollingBuffer::new(closes.len()).unwrap();
        let base = NaiveDate::from_ymd_opt(2021, 3, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        for (i, close) in closes.iter().enumerate() {
            let price = Decimal::from(*close);
            let mut bar = Bar::seeded(
                "rb2105",
                Exchange::Shfe,
                base + chrono::Duration::minutes(i as i64),
                Interval::Minute,
                price,
            );
            bar.high = price + dec!(2);
            bar.low = price - dec!(2);
            bar.volume = dec!(10);
            buffer.update(&bar);
        }
        buffer
    }

    #[test]
    fn test_requires_inited_buffer() {
        let buffer = RollingBuffer::new(5).unwrap();
        match sma(&buffer, 3) {
            Err(IndicatorError::NotInited { count, capacity }) => {
                assert_eq!(count, 0);
                assert_eq!(capacity, 5);
            }
            other => panic!("expected NotInited, got {other:?}"),
        }
    }

    #[test]
    fn test_period_longer_than_buffer() {
        let buffer = filled(&[1, 2, 3]);
        assert!(matches!(
            ema(&buffer, 4),
            Err(IndicatorError::PeriodTooLong {
                period: 4,
                capacity: 3
            })
        ));
    }

    #[test]
    fn test_zero_period_is_invalid() {
        let buffer = filled(&[1, 2, 3]);
        assert!(matches!(rsi(&buffer, 0), Err(IndicatorError::Invalid(_))));
    }

    #[test]
    fn test_sma_uses_newest_closes() {
        let buffer = filled(&[1, 2, 3, 4, 5]);
        assert!((sma(&buffer, 3).unwrap() - 4.0).abs() < 1e-9);
        assert!((sma(&buffer, 5).unwrap() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_flat_prices() {
        let buffer = filled(&[100, 100, 100, 100]);
        assert!(std(&buffer, 4).unwrap().abs() < 1e-9);

        let bands = boll(&buffer, 4, 2.0).unwrap();
        assert!((bands.middle - 100.0).abs() < 1e-9);
        assert!((bands.upper - bands.lower).abs() < 1e-9);

        // every bar spans low..high = 4
        assert!((atr(&buffer, 3).unwrap() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_rsi_rising_market() {
        let buffer = filled(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        assert!(rsi(&buffer, 5).unwrap() > 70.0);
    }
}
