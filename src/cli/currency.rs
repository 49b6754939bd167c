use super::{parse_symbol, ui};
use crate::core::{Currency, CurrencyHistory, Ledger};
use anyhow::{Context, Result};
use clap::Subcommand;
use comfy_table::Cell;
use rust_decimal::Decimal;

#[derive(Debug, Subcommand)]
pub enum CurrencyCommand {
    /// Start tracking a currency
    Add {
        #[arg(value_parser = parse_symbol)]
        symbol: String,
        /// Last known value in USD
        #[arg(long)]
        usd_value: Option<Decimal>,
    },
    /// List tracked currencies
    List,
    /// Set the cached USD value of a currency
    SetUsdValue {
        #[arg(value_parser = parse_symbol)]
        symbol: String,
        usd_value: Decimal,
    },
    /// Stop tracking a currency, removing everything that refers to it
    Remove {
        #[arg(value_parser = parse_symbol)]
        symbol: String,
    },
}

pub async fn run(command: CurrencyCommand, ledger: &Ledger) -> Result<()> {
    match command {
        CurrencyCommand::Add { symbol, usd_value } => {
            let mut currency = Currency::new(&symbol)?;
            if let Some(usd_value) = usd_value {
                currency = currency.with_usd_value(usd_value)?;
            }
            let currency = ledger.add_currency(currency).await?;
            println!("Added {} (USD {})", currency, currency.usd_value);
        }
        CurrencyCommand::List => {
            println!("{}", currencies_table(&ledger.currencies().await?));
        }
        CurrencyCommand::SetUsdValue { symbol, usd_value } => {
            let currency = ledger.set_currency_usd_value(&symbol, usd_value).await?;
            println!("{} is now USD {}", currency, currency.usd_value);
        }
        CurrencyCommand::Remove { symbol } => {
            let report = ledger.delete_currency(&symbol).await?;
            println!(
                "Removed {symbol} with {} history rows, {} balances, {} transactions and {} goals",
                report.histories, report.balances, report.transactions, report.goals
            );
        }
    }
    Ok(())
}

/// Fetches the current USD rate of `symbol` and records it.
pub async fn rate(symbol: &str, ledger: &Ledger) -> Result<()> {
    let record = ledger
        .fetch_and_record(symbol)
        .await
        .with_context(|| format!("Failed to record USD rate for {symbol}"))?;
    println!(
        "{} = {} USD ({})",
        record.symbol,
        record.usd_value,
        ui::style_text(&record.created_at.to_rfc3339(), ui::StyleType::Subtle)
    );
    Ok(())
}

pub async fn history(symbol: &str, ledger: &Ledger) -> Result<()> {
    ledger.require_currency(symbol).await?;
    let records = ledger.history(symbol).await?;
    println!("{}", history_table(symbol, &records));
    Ok(())
}

pub fn currencies_table(currencies: &[Currency]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Symbol"), ui::header_cell("USD value")]);
    for currency in currencies {
        table.add_row(vec![
            Cell::new(&currency.symbol),
            ui::number_cell(ui::fixed(currency.usd_value, 2)),
        ]);
    }
    table.to_string()
}

pub fn history_table(symbol: &str, records: &[CurrencyHistory]) -> String {
    let mut output = format!(
        "USD history: {}\n\n",
        ui::style_text(symbol, ui::StyleType::Title)
    );

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Recorded at"),
        ui::header_cell("USD value"),
        ui::header_cell("Change"),
    ]);

    let mut previous: Option<Decimal> = None;
    for record in records {
        let change = previous
            .filter(|p| !p.is_zero())
            .map(|p| (record.usd_value - p) / p * Decimal::ONE_HUNDRED);
        table.add_row(vec![
            Cell::new(record.created_at.format("%Y-%m-%d %H:%M:%S").to_string()),
            ui::number_cell(ui::fixed(record.usd_value, 6)),
            change.map_or_else(|| ui::na_cell(false), ui::change_cell),
        ]);
        previous = Some(record.usd_value);
    }

    output.push_str(&table.to_string());
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    #[test]
    fn test_currencies_table() {
        let currencies = vec![
            Currency::new("BRL").unwrap().with_usd_value(dec!(0.18)).unwrap(),
            Currency::new("EUR").unwrap(),
        ];
        let output = currencies_table(&currencies);
        assert!(output.contains("BRL"));
        assert!(output.contains("0.18"));
        assert!(output.contains("EUR"));
        assert!(output.contains("1.00"));
    }

    #[test]
    fn test_history_table_shows_change_between_rows() {
        let at = |minute| Utc.with_ymd_and_hms(2024, 6, 10, 12, minute, 0).unwrap();
        let records = vec![
            CurrencyHistory::new(1, "EUR", dec!(1.000000), at(0)),
            CurrencyHistory::new(2, "EUR", dec!(1.050000), at(5)),
        ];
        let output = history_table("EUR", &records);
        assert!(output.contains("2024-06-10 12:05:00"));
        assert!(output.contains("1.050000"));
        assert!(output.contains("5.00%"));
        assert!(output.contains("N/A"));
    }
}
