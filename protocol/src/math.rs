//! Overflow-checked fixed-point arithmetic.
//!
//! Prices carry 18 decimals and supplies can approach `u64::MAX`, so every
//! product is taken in `u128` and narrowed back with a check.

use thiserror::Error;

/// Arithmetic failures. Never silently wrapped or saturated.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    #[error("division by zero")]
    DivideByZero,

    #[error("arithmetic overflow")]
    Overflow,
}

/// Computes `a * b / d`, truncating toward zero.
///
/// The product is exact in `u128`; the quotient must fit back in `u64`.
pub fn mul_div(a: u64, b: u64, d: u64) -> Result<u64, MathError> {
    if d == 0 {
        return Err(MathError::DivideByZero);
    }
    let product = (a as u128)
        .checked_mul(b as u128)
        .ok_or(MathError::Overflow)?;
    u64::try_from(product / d as u128).map_err(|_| MathError::Overflow)
}

/// Returns `true` when `value` lies more than `percent`% above `reference`,
/// i.e. `value * 100 > reference * (100 + percent)`.
///
/// Evaluated entirely in integers so there is no rounding at the boundary.
pub fn exceeds_by_percent(value: u64, reference: u64, percent: u64) -> bool {
    (value as u128) * 100 > (reference as u128) * (100 + percent as u128)
}

/// Returns `true` when `|value - reference|` is more than `percent`% of
/// `reference`, i.e. `|value - reference| * 100 > reference * percent`.
pub fn deviates_by_more_than(value: u64, reference: u64, percent: u64) -> bool {
    let deviation = value.abs_diff(reference) as u128;
    deviation * 100 > (reference as u128) * (percent as u128)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PEG_TARGET;

    #[test]
    fn mul_div_truncates() {
        assert_eq!(mul_div(10, 10, 3).unwrap(), 33);
        assert_eq!(mul_div(0, 10, 3).unwrap(), 0);
    }

    #[test]
    fn mul_div_survives_large_intermediates() {
        // 0.5 * u64::MAX-ish supply, scaled by 1e18, fits in u128.
        let supply = u64::MAX / 2;
        assert_eq!(mul_div(PEG_TARGET / 2, supply, PEG_TARGET).unwrap(), supply / 2);
    }

    #[test]
    fn mul_div_reports_overflow_and_zero_divisor() {
        assert_eq!(mul_div(u64::MAX, u64::MAX, 1), Err(MathError::Overflow));
        assert_eq!(mul_div(1, 1, 0), Err(MathError::DivideByZero));
    }

    #[test]
    fn one_percent_band_boundary() {
        let at_band = PEG_TARGET / 100 * 101;
        assert!(!exceeds_by_percent(at_band, PEG_TARGET, 1));
        assert!(exceeds_by_percent(at_band + 1, PEG_TARGET, 1));
        assert!(!exceeds_by_percent(PEG_TARGET, PEG_TARGET, 1));
    }

    #[test]
    fn deviation_is_symmetric() {
        let two_pct = PEG_TARGET / 50;
        assert!(!deviates_by_more_than(PEG_TARGET + two_pct, PEG_TARGET, 2));
        assert!(deviates_by_more_than(PEG_TARGET + two_pct + 1, PEG_TARGET, 2));
        assert!(deviates_by_more_than(PEG_TARGET - two_pct - 1, PEG_TARGET, 2));
    }
}
