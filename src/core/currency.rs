//! Currency records and the USD quote abstraction

use crate::core::decimal::MONEY;
use crate::core::error::{RateFetchError, ValidationError};
use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

const MAX_SYMBOL_LEN: usize = 10;

/// A tradable currency, identified by its symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub symbol: String,
    pub usd_value: Decimal,
}

impl Currency {
    pub fn new(symbol: &str) -> Result<Self, ValidationError> {
        validate_symbol(symbol)?;
        Ok(Self {
            symbol: symbol.to_string(),
            usd_value: dec!(1.00),
        })
    }

    pub fn with_usd_value(mut self, usd_value: Decimal) -> Result<Self, ValidationError> {
        self.usd_value = MONEY.fit("usd_value", usd_value)?;
        Ok(self)
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

/// Symbols are stored as the rate API quotes them: upper case, at most ten
/// characters, no whitespace.
pub fn validate_symbol(symbol: &str) -> Result<(), ValidationError> {
    let len = symbol.chars().count();
    if len == 0
        || len > MAX_SYMBOL_LEN
        || symbol.chars().any(|c| c.is_whitespace() || c.is_lowercase())
    {
        return Err(ValidationError::InvalidSymbol(symbol.to_string()));
    }
    Ok(())
}

/// Source of live USD ask quotes for a currency symbol.
#[async_trait]
pub trait UsdRateProvider: Send + Sync {
    /// Human-readable name of this provider (for logs).
    fn name(&self) -> &str;

    async fn usd_ask(&self, symbol: &str) -> Result<Decimal, RateFetchError>;
}
