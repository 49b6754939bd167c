use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A snapshot of a currency's USD rate at a point in time.
///
/// Rows are append-only. The only way the ledger creates one is from a
/// freshly fetched quote, see [`crate::core::ledger::Ledger::fetch_and_record`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyHistory {
    pub id: u64,
    pub symbol: String,
    pub usd_value: Decimal,
    pub created_at: DateTime<Utc>,
}

impl CurrencyHistory {
    pub fn new(id: u64, symbol: &str, usd_value: Decimal, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            symbol: symbol.to_string(),
            usd_value,
            created_at,
        }
    }
}
