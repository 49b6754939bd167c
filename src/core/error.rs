//! Error types for the ledger and its collaborators.

use rust_decimal::Decimal;
use thiserror::Error;

/// Failure while fetching a USD quote from a rate source.
#[derive(Debug, Error)]
pub enum RateFetchError {
    #[error("Network error fetching {symbol}-USD: {message}")]
    Network { symbol: String, message: String },

    #[error("Failed to parse rate response for {symbol}-USD: {message}")]
    Parse { symbol: String, message: String },

    #[error("Rate response for {symbol}-USD has no `{field}` field")]
    MissingField { symbol: String, field: String },
}

impl RateFetchError {
    pub fn is_network(&self) -> bool {
        matches!(self, RateFetchError::Network { .. })
    }
}

/// A value rejected before it reaches the store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("share_portfolio must be within [0, 1], got {0}")]
    ShareOutOfRange(Decimal),

    #[error("{field} does not fit {max_digits} digits with {decimal_places} decimal places: {value}")]
    TooManyDigits {
        field: &'static str,
        max_digits: u32,
        decimal_places: u32,
        value: Decimal,
    },

    #[error("Invalid currency symbol {0:?}: expected 1 to 10 upper-case characters without whitespace")]
    InvalidSymbol(String),
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Percentage difference is undefined for a zero initial value")]
pub struct DivisionByZeroError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Disk store error: {0}")]
    Disk(#[from] fjall::Error),

    #[error("Data directory error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Record encoding error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Every public `Ledger` operation returns `Result<T, LedgerError>`.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    RateFetch(#[from] RateFetchError),

    #[error(transparent)]
    DivisionByZero(#[from] DivisionByZeroError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Currency {0} already exists")]
    DuplicateSymbol(String),

    #[error("{kind} {key} not found")]
    NotFound { kind: &'static str, key: String },

    #[error("Exchange goal {0} has already been executed")]
    GoalAlreadyExecuted(u64),

    #[error("Transaction {0} is already linked to an exchange goal")]
    TransactionAlreadyLinked(u64),
}

impl LedgerError {
    pub(crate) fn not_found(kind: &'static str, key: impl ToString) -> Self {
        LedgerError::NotFound {
            kind,
            key: key.to_string(),
        }
    }
}
