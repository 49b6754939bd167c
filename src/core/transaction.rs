use crate::core::decimal::MONEY;
use crate::core::error::ValidationError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

pub const DEFAULT_COMMISSION: Decimal = dec!(1.00);

/// A completed exchange between two currencies. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: u64,
    pub origin_currency: String,
    pub destination_currency: String,
    pub original_currency_value: Decimal,
    pub destination_currency_value: Decimal,
    pub commission: Decimal,
    pub exchange_date: DateTime<Utc>,
}

/// The caller-supplied part of a transaction; the ledger assigns the id and
/// the exchange date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub origin_currency: String,
    pub destination_currency: String,
    pub original_currency_value: Decimal,
    pub destination_currency_value: Decimal,
    pub commission: Decimal,
}

impl NewTransaction {
    pub fn new(
        origin_currency: &str,
        destination_currency: &str,
        original_currency_value: Decimal,
        destination_currency_value: Decimal,
    ) -> Self {
        Self {
            origin_currency: origin_currency.to_string(),
            destination_currency: destination_currency.to_string(),
            original_currency_value,
            destination_currency_value,
            commission: DEFAULT_COMMISSION,
        }
    }

    pub fn with_commission(mut self, commission: Decimal) -> Self {
        self.commission = commission;
        self
    }

    pub(crate) fn into_transaction(
        self,
        id: u64,
        exchange_date: DateTime<Utc>,
    ) -> Result<Transaction, ValidationError> {
        Ok(Transaction {
            id,
            origin_currency: self.origin_currency,
            destination_currency: self.destination_currency,
            original_currency_value: MONEY
                .fit("original_currency_value", self.original_currency_value)?,
            destination_currency_value: MONEY
                .fit("destination_currency_value", self.destination_currency_value)?,
            commission: MONEY.fit("commission", self.commission)?,
            exchange_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commission_defaults_to_one() {
        let tx = NewTransaction::new("EUR", "BTC", dec!(100), dec!(0.0015));
        assert_eq!(tx.commission, dec!(1.00));
    }

    #[test]
    fn test_into_transaction_fits_money_columns() {
        let now = Utc::now();
        let tx = NewTransaction::new("EUR", "USD", dec!(100.555), dec!(108.4449))
            .with_commission(dec!(0.5))
            .into_transaction(7, now)
            .unwrap();
        assert_eq!(tx.id, 7);
        assert_eq!(tx.original_currency_value, dec!(100.56));
        assert_eq!(tx.destination_currency_value, dec!(108.44));
        assert_eq!(tx.commission, dec!(0.50));
        assert_eq!(tx.exchange_date, now);
    }
}
