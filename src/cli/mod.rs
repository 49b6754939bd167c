pub mod balance;
pub mod currency;
pub mod goal;
pub mod portfolio;
pub mod setup;
pub mod transaction;
pub mod ui;

use crate::core::Ledger;
use crate::core::currency::validate_symbol;
use anyhow::Result;
use clap::Subcommand;

/// Commands that operate on the ledger.
#[derive(Debug, Subcommand)]
pub enum AppCommand {
    /// Manage tracked currencies
    #[command(subcommand)]
    Currency(currency::CurrencyCommand),
    /// Fetch the current USD rate of a currency and record it
    Rate {
        #[arg(value_parser = parse_symbol)]
        symbol: String,
    },
    /// Show the recorded USD rates of a currency
    History {
        #[arg(value_parser = parse_symbol)]
        symbol: String,
    },
    /// Manage portfolio balances
    #[command(subcommand)]
    Balance(balance::BalanceCommand),
    /// Record fresh USD rates for every balance and show the portfolio
    Portfolio,
    /// Manage completed exchanges
    #[command(subcommand)]
    Transaction(transaction::TransactionCommand),
    /// Manage exchange goals
    #[command(subcommand)]
    Goal(goal::GoalCommand),
}

/// Accepts symbols in any case and stores them upper case.
pub fn parse_symbol(input: &str) -> Result<String, String> {
    let symbol = input.trim().to_uppercase();
    validate_symbol(&symbol).map_err(|e| e.to_string())?;
    Ok(symbol)
}

pub async fn execute(command: AppCommand, ledger: &Ledger) -> Result<()> {
    match command {
        AppCommand::Currency(cmd) => currency::run(cmd, ledger).await,
        AppCommand::Rate { symbol } => currency::rate(&symbol, ledger).await,
        AppCommand::History { symbol } => currency::history(&symbol, ledger).await,
        AppCommand::Balance(cmd) => balance::run(cmd, ledger).await,
        AppCommand::Portfolio => portfolio::run(ledger).await,
        AppCommand::Transaction(cmd) => transaction::run(cmd, ledger).await,
        AppCommand::Goal(cmd) => goal::run(cmd, ledger).await,
    }
}
