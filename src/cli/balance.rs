use super::{parse_symbol, ui};
use crate::core::{CurrencyBalance, Ledger};
use anyhow::Result;
use clap::Subcommand;
use comfy_table::Cell;
use rust_decimal::Decimal;

#[derive(Debug, Subcommand)]
pub enum BalanceCommand {
    /// Add a balance held in a tracked currency
    Add {
        #[arg(value_parser = parse_symbol)]
        symbol: String,
        #[arg(long, default_value = "0")]
        value: Decimal,
        /// Target share of the portfolio, between 0 and 1
        #[arg(long, default_value = "0")]
        share: Decimal,
    },
    /// List balances with their last recorded USD rate
    List,
    /// Change the value or target share of a balance
    Update {
        id: u64,
        #[arg(long)]
        value: Option<Decimal>,
        #[arg(long)]
        share: Option<Decimal>,
    },
    /// Remove a balance and its exchange goals
    Remove { id: u64 },
}

pub async fn run(command: BalanceCommand, ledger: &Ledger) -> Result<()> {
    match command {
        BalanceCommand::Add {
            symbol,
            value,
            share,
        } => {
            let balance = ledger.add_balance(&symbol, value, share).await?;
            println!("Added balance #{}: {}", balance.id, balance);
        }
        BalanceCommand::List => {
            let balances = ledger.balances().await?;
            let mut rows = Vec::with_capacity(balances.len());
            for balance in balances {
                let rate = ledger.last_usd_balance(balance.id).await?;
                rows.push((balance, rate));
            }
            println!("{}", balances_table(&rows));
        }
        BalanceCommand::Update { id, value, share } => {
            let balance = ledger.update_balance(id, value, share).await?;
            println!(
                "Balance #{} is now {} (share {})",
                balance.id, balance, balance.share_portfolio
            );
        }
        BalanceCommand::Remove { id } => {
            let report = ledger.delete_balance(id).await?;
            println!("Removed balance #{id} and {} goals", report.goals);
        }
    }
    Ok(())
}

/// Balances next to the last USD rate recorded for their currency.
pub fn balances_table(rows: &[(CurrencyBalance, Option<Decimal>)]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("#"),
        ui::header_cell("Currency"),
        ui::header_cell("Value"),
        ui::header_cell("Target share"),
        ui::header_cell("Last USD rate"),
        ui::header_cell("Created"),
    ]);

    for (balance, rate) in rows {
        table.add_row(vec![
            ui::number_cell(balance.id),
            Cell::new(&balance.currency),
            ui::number_cell(ui::fixed(balance.value, 2)),
            ui::number_cell(format!(
                "{}%",
                ui::fixed(balance.share_portfolio * Decimal::ONE_HUNDRED, 0)
            )),
            ui::format_optional_cell(*rate, |r| ui::fixed(r, 6)),
            Cell::new(balance.created_at.format("%Y-%m-%d").to_string()),
        ]);
    }
    table.to_string()
}
