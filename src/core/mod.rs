//! Core records, derived computations and the ledger

pub mod balance;
pub mod config;
pub mod currency;
pub mod decimal;
pub mod error;
pub mod goal;
pub mod history;
pub mod ledger;
pub mod log;
pub mod transaction;

// Re-export main types for cleaner imports
pub use balance::CurrencyBalance;
pub use currency::{Currency, UsdRateProvider};
pub use error::{DivisionByZeroError, LedgerError, RateFetchError, StoreError, ValidationError};
pub use goal::{ExchangeGoal, GoalStatus};
pub use history::CurrencyHistory;
pub use ledger::{CascadeReport, Ledger};
pub use transaction::{NewTransaction, Transaction};
