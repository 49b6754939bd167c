use crate::core::decimal::{FRACTION, MONEY};
use crate::core::error::ValidationError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A portfolio line item: an amount held in one currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyBalance {
    pub id: u64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub share_portfolio: Decimal,
    pub value: Decimal,
}

impl CurrencyBalance {
    pub fn new(
        id: u64,
        currency: &str,
        value: Decimal,
        share_portfolio: Decimal,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id,
            currency: currency.to_string(),
            created_at,
            share_portfolio: validate_share(share_portfolio)?,
            value: MONEY.fit("value", value)?,
        })
    }

    pub fn set_value(&mut self, value: Decimal) -> Result<(), ValidationError> {
        self.value = MONEY.fit("value", value)?;
        Ok(())
    }

    pub fn set_share_portfolio(&mut self, share: Decimal) -> Result<(), ValidationError> {
        self.share_portfolio = validate_share(share)?;
        Ok(())
    }

    /// Value of this balance in USD at the given rate.
    pub fn usd_amount(&self, usd_rate: Decimal) -> Decimal {
        self.value * usd_rate
    }
}

impl Display for CurrencyBalance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.currency, self.value)
    }
}

/// Shares outside [0, 1] are rejected rather than clamped.
fn validate_share(share: Decimal) -> Result<Decimal, ValidationError> {
    if share < Decimal::ZERO || share > Decimal::ONE {
        return Err(ValidationError::ShareOutOfRange(share));
    }
    FRACTION.fit("share_portfolio", share)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn balance(value: Decimal, share: Decimal) -> Result<CurrencyBalance, ValidationError> {
        CurrencyBalance::new(1, "EUR", value, share, Utc::now())
    }

    #[test]
    fn test_share_bounds_are_inclusive() {
        assert!(balance(dec!(10), dec!(0)).is_ok());
        assert!(balance(dec!(10), dec!(1)).is_ok());
        assert!(balance(dec!(10), dec!(0.5)).is_ok());
    }

    #[test]
    fn test_share_outside_range_is_rejected() {
        assert_eq!(
            balance(dec!(10), dec!(1.01)).unwrap_err(),
            ValidationError::ShareOutOfRange(dec!(1.01))
        );
        assert_eq!(
            balance(dec!(10), dec!(-0.1)).unwrap_err(),
            ValidationError::ShareOutOfRange(dec!(-0.1))
        );

        let mut b = balance(dec!(10), dec!(0.2)).unwrap();
        assert!(b.set_share_portfolio(dec!(2)).is_err());
        assert_eq!(b.share_portfolio, dec!(0.2));
    }

    #[test]
    fn test_display_and_usd_amount() {
        let b = balance(dec!(150.00), dec!(0.25)).unwrap();
        assert_eq!(b.to_string(), "EUR 150.00");
        assert_eq!(b.usd_amount(dec!(1.085)), dec!(162.75));
    }
}
