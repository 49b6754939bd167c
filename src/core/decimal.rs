//! Fixed-precision column specs for decimal fields.

use crate::core::error::ValidationError;
use rust_decimal::Decimal;

/// Storage shape of a decimal column: total significant digits and the
/// number of those that sit after the decimal point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalSpec {
    pub max_digits: u32,
    pub decimal_places: u32,
}

/// Amounts of money: balances, transaction legs, commissions.
pub const MONEY: DecimalSpec = DecimalSpec::new(10, 2);
/// Exchange rates recorded in currency history.
pub const RATE: DecimalSpec = DecimalSpec::new(10, 6);
/// Fractions in [0, 1] or small thresholds.
pub const FRACTION: DecimalSpec = DecimalSpec::new(5, 2);

impl DecimalSpec {
    pub const fn new(max_digits: u32, decimal_places: u32) -> Self {
        Self {
            max_digits,
            decimal_places,
        }
    }

    /// Rounds `value` to the column's scale (banker's rounding) and rejects
    /// it when the integer part does not fit.
    pub fn fit(&self, field: &'static str, value: Decimal) -> Result<Decimal, ValidationError> {
        let rounded = value.round_dp(self.decimal_places);
        let integer_digits = count_digits(rounded.trunc().abs());
        if integer_digits > self.max_digits - self.decimal_places {
            return Err(ValidationError::TooManyDigits {
                field,
                max_digits: self.max_digits,
                decimal_places: self.decimal_places,
                value,
            });
        }
        Ok(rounded)
    }
}

fn count_digits(integer: Decimal) -> u32 {
    if integer.is_zero() {
        return 0;
    }
    integer.normalize().to_string().len() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_fit_rounds_to_scale() {
        assert_eq!(MONEY.fit("value", dec!(10.005)).unwrap(), dec!(10.00));
        assert_eq!(MONEY.fit("value", dec!(10.015)).unwrap(), dec!(10.02));
        assert_eq!(RATE.fit("usd_value", dec!(0.18345678)).unwrap(), dec!(0.183457));
    }

    #[test]
    fn test_fit_accepts_largest_value() {
        assert_eq!(
            MONEY.fit("value", dec!(99999999.99)).unwrap(),
            dec!(99999999.99)
        );
        assert_eq!(RATE.fit("usd_value", dec!(9999.999999)).unwrap(), dec!(9999.999999));
    }

    #[test]
    fn test_fit_rejects_overflowing_integer_part() {
        let err = MONEY.fit("value", dec!(100000000)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooManyDigits {
                field: "value",
                max_digits: 10,
                decimal_places: 2,
                value: dec!(100000000),
            }
        );
        assert!(RATE.fit("usd_value", dec!(64321.5)).is_err());
        assert!(FRACTION.fit("threshold", dec!(-1000)).is_err());
    }

    #[test]
    fn test_fit_handles_zero_and_negatives() {
        assert_eq!(FRACTION.fit("share_portfolio", Decimal::ZERO).unwrap(), dec!(0));
        assert_eq!(MONEY.fit("value", dec!(-12.345)).unwrap(), dec!(-12.34));
    }
}
