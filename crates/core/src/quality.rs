//! Quality filters for live quote data.
//!
//! Option-chain feeds hand back zeros and out-of-range placeholders for
//! illiquid strikes. These helpers null obviously bad values out instead of
//! letting them overwrite a position's last good snapshot.

use rust_decimal::Decimal;

/// Delta outside this band is a feed artifact, not a greek.
const DELTA_BOUND: f64 = 5.0;

/// Implied vol above 1000% is treated as garbage.
const IV_CEILING: f64 = 10.0;

/// Cleans a delta value. Zero is a common "missing" placeholder.
#[must_use]
pub fn clean_delta(delta: f64) -> Option<f64> {
    if delta == 0.0 || !delta.is_finite() || delta.abs() > DELTA_BOUND {
        None
    } else {
        Some(delta)
    }
}

/// Cleans an implied-volatility value (expressed as a fraction, 1.0 = 100%).
#[must_use]
pub fn clean_iv(iv: f64) -> Option<f64> {
    if iv <= 0.0 || !iv.is_finite() || iv > IV_CEILING {
        None
    } else {
        Some(iv)
    }
}

/// Cleans a mark price. Zero and negative marks are placeholders.
#[must_use]
pub fn clean_mark(mark: Decimal) -> Option<Decimal> {
    if mark <= Decimal::ZERO {
        None
    } else {
        Some(mark)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_clean_delta() {
        assert_eq!(clean_delta(0.28), Some(0.28));
        assert_eq!(clean_delta(-0.35), Some(-0.35));
        assert_eq!(clean_delta(0.0), None);
        assert_eq!(clean_delta(7.5), None);
        assert_eq!(clean_delta(-12.0), None);
        assert_eq!(clean_delta(f64::NAN), None);
    }

    #[test]
    fn test_clean_iv() {
        assert_eq!(clean_iv(1.29), Some(1.29));
        assert_eq!(clean_iv(0.0), None);
        assert_eq!(clean_iv(-0.5), None);
        assert_eq!(clean_iv(11.0), None);
        assert_eq!(clean_iv(f64::INFINITY), None);
    }

    #[test]
    fn test_clean_mark() {
        assert_eq!(clean_mark(dec!(1.49)), Some(dec!(1.49)));
        assert_eq!(clean_mark(dec!(0)), None);
        assert_eq!(clean_mark(dec!(-0.10)), None);
    }
}
