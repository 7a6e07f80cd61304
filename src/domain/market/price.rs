use crate::domain::errors::PriceError;
use rust_decimal::Decimal;

fn check_target(target: Decimal) -> Result<(), PriceError> {
    if target <= Decimal::ZERO {
        return Err(PriceError::NonPositiveTarget { target });
    }
    Ok(())
}

/// Rounds `value` to the nearest multiple of `target` (ties to even).
pub fn round_to(value: Decimal, target: Decimal) -> Result<Decimal, PriceError> {
    check_target(target)?;
    Ok((value / target).round() * target)
}

/// Largest multiple of `target` not above `value`.
pub fn floor_to(value: Decimal, target: Decimal) -> Result<Decimal, PriceError> {
    check_target(target)?;
    Ok((value / target).floor() * target)
}

/// Smallest multiple of `target` not below `value`.
pub fn ceil_to(value: Decimal, target: Decimal) -> Result<Decimal, PriceError> {
    check_target(target)?;
    Ok((value / target).ceil() * target)
}

/// Number of significant fractional digits.
pub fn digits(value: Decimal) -> u32 {
    value.normalize().scale()
}
