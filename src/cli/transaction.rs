use super::{parse_symbol, ui};
use crate::core::{Ledger, NewTransaction, Transaction};
use anyhow::Result;
use clap::Subcommand;
use comfy_table::Cell;
use rust_decimal::Decimal;

#[derive(Debug, Subcommand)]
pub enum TransactionCommand {
    /// Record a completed exchange
    Add {
        #[arg(value_parser = parse_symbol)]
        origin: String,
        #[arg(value_parser = parse_symbol)]
        destination: String,
        #[arg(long)]
        original_value: Decimal,
        #[arg(long)]
        destination_value: Decimal,
        /// Defaults to 1.00
        #[arg(long)]
        commission: Option<Decimal>,
    },
    /// List recorded exchanges
    List,
    /// Remove a transaction and the goal it executed
    Remove { id: u64 },
}

pub async fn run(command: TransactionCommand, ledger: &Ledger) -> Result<()> {
    match command {
        TransactionCommand::Add {
            origin,
            destination,
            original_value,
            destination_value,
            commission,
        } => {
            let mut new = NewTransaction::new(&origin, &destination, original_value, destination_value);
            if let Some(commission) = commission {
                new = new.with_commission(commission);
            }
            let tx = ledger.record_transaction(new).await?;
            println!(
                "Recorded transaction #{}: {} {} -> {} {}",
                tx.id,
                tx.original_currency_value,
                tx.origin_currency,
                tx.destination_currency_value,
                tx.destination_currency
            );
        }
        TransactionCommand::List => {
            println!("{}", transactions_table(&ledger.transactions().await?));
        }
        TransactionCommand::Remove { id } => {
            let report = ledger.delete_transaction(id).await?;
            println!("Removed transaction #{id} and {} goals", report.goals);
        }
    }
    Ok(())
}

pub fn transactions_table(transactions: &[Transaction]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("#"),
        ui::header_cell("Date"),
        ui::header_cell("From"),
        ui::header_cell("Amount"),
        ui::header_cell("To"),
        ui::header_cell("Received"),
        ui::header_cell("Commission"),
    ]);

    for tx in transactions {
        table.add_row(vec![
            ui::number_cell(tx.id),
            Cell::new(tx.exchange_date.format("%Y-%m-%d %H:%M").to_string()),
            Cell::new(&tx.origin_currency),
            ui::number_cell(ui::fixed(tx.original_currency_value, 2)),
            Cell::new(&tx.destination_currency),
            ui::number_cell(ui::fixed(tx.destination_currency_value, 2)),
            ui::number_cell(ui::fixed(tx.commission, 2)),
        ]);
    }
    table.to_string()
}
