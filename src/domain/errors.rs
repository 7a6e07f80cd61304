use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::market::interval::Interval;

/// Errors raised when constructing a rolling buffer
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BufferError {
    #[error("Rolling buffer capacity must be at least 1, got {capacity}")]
    ZeroCapacity { capacity: usize },
}

/// Errors raised when configuring a bar generator window
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregationError {
    #[error("Window size must be at least 1")]
    ZeroWindow,

    #[error("Window aggregation supports minute or hour intervals, got {interval}")]
    UnsupportedInterval { interval: Interval },
}

/// Errors related to instrument identifiers
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SymbolError {
    #[error("Malformed vt_symbol '{vt_symbol}': expected <symbol>.<EXCHANGE>")]
    Malformed { vt_symbol: String },

    #[error("Unknown exchange code: {code}")]
    UnknownExchange { code: String },
}

/// Errors raised by price snapping helpers
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceError {
    #[error("Price target must be positive, got {target}")]
    NonPositiveTarget { target: Decimal },
}

/// Errors raised by indicators computed over a rolling buffer
#[derive(Debug, Error)]
pub enum IndicatorError {
    #[error("Rolling buffer not inited: {count}/{capacity} bars")]
    NotInited { count: usize, capacity: usize },

    #[error("Indicator period {period} exceeds buffer capacity {capacity}")]
    PeriodTooLong { period: usize, capacity: usize },

    #[error("Invalid indicator parameters: {0:?}")]
    Invalid(ta::errors::TaError),
}

/// Errors raised while registering instruments with the strategy engine
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    Symbol(#[from] SymbolError),

    #[error(transparent)]
    Buffer(#[from] BufferError),

    #[error("A strategy is already registered for {vt_symbol}")]
    DuplicateSymbol { vt_symbol: String },
}

impl From<ta::errors::TaError> for IndicatorError {
    fn from(err: ta::errors::TaError) -> Self {
        IndicatorError::Invalid(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_buffer_error_formatting() {
        let msg = BufferError::ZeroCapacity { capacity: 0 }.to_string();
        assert!(msg.contains("at least 1"));
        assert!(msg.contains('0'));
    }

    #[test]
    fn test_aggregation_error_formatting() {
        let err = AggregationError::UnsupportedInterval {
            interval: Interval::Daily,
        };
        assert!(err.to_string().ends_with("got d"));
    }

    #[test]
    fn test_price_error_formatting() {
        let err = PriceError::NonPositiveTarget { target: dec!(-0.5) };
        assert!(err.to_string().contains("-0.5"));
    }
}
