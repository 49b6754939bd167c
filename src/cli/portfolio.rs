use super::ui;
use crate::core::{CurrencyBalance, Ledger};
use anyhow::Result;
use comfy_table::Cell;
use futures::future::join_all;
use rust_decimal::Decimal;
use tracing::debug;

/// A balance together with the USD rate just recorded for it.
#[derive(Debug, Clone)]
pub struct BalanceValue {
    pub balance: CurrencyBalance,
    pub usd_rate: Option<Decimal>,
    pub usd_amount: Option<Decimal>,
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct PortfolioValue {
    pub balances: Vec<BalanceValue>,
    /// Sum of every balance in USD; `None` if any rate is missing.
    pub total_usd: Option<Decimal>,
}

impl PortfolioValue {
    pub fn from_rates(rates: Vec<(CurrencyBalance, Result<Decimal, String>)>) -> Self {
        let mut total = Decimal::ZERO;
        let mut all_valid = true;

        let balances = rates
            .into_iter()
            .map(|(balance, rate)| match rate {
                Ok(rate) => {
                    let usd_amount = balance.usd_amount(rate);
                    total += usd_amount;
                    BalanceValue {
                        balance,
                        usd_rate: Some(rate),
                        usd_amount: Some(usd_amount),
                        error: None,
                    }
                }
                Err(error) => {
                    all_valid = false;
                    BalanceValue {
                        balance,
                        usd_rate: None,
                        usd_amount: None,
                        error: Some(error),
                    }
                }
            })
            .collect();

        Self {
            balances,
            total_usd: all_valid.then_some(total),
        }
    }

    /// Share of the USD total actually held in `value`.
    fn actual_share(&self, value: &BalanceValue) -> Option<Decimal> {
        let total = self.total_usd.filter(|t| !t.is_zero())?;
        value.usd_amount.map(|amount| amount / total)
    }

    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("#"),
            ui::header_cell("Balance"),
            ui::header_cell("USD rate"),
            ui::header_cell("Value (USD)"),
            ui::header_cell("Target share"),
            ui::header_cell("Actual share"),
        ]);

        for value in &self.balances {
            let has_error = value.error.is_some();
            let rate = value
                .usd_rate
                .map_or_else(|| ui::na_cell(has_error), |r| ui::number_cell(ui::fixed(r, 6)));
            let amount = value
                .usd_amount
                .map_or_else(|| ui::na_cell(has_error), |a| ui::number_cell(ui::fixed(a, 2)));
            let percent = |share: Decimal| format!("{}%", ui::fixed(share * Decimal::ONE_HUNDRED, 2));

            table.add_row(vec![
                ui::number_cell(value.balance.id),
                Cell::new(value.balance.to_string()),
                rate,
                amount,
                ui::number_cell(percent(value.balance.share_portfolio)),
                ui::format_optional_cell(self.actual_share(value), percent),
            ]);
        }

        let mut output = format!(
            "{}\n\n",
            ui::style_text("Portfolio", ui::StyleType::Title)
        );
        output.push_str(&table.to_string());

        let (total, total_style) = match self.total_usd {
            Some(total) => (ui::fixed(total, 2), ui::StyleType::TotalValue),
            None => ("N/A".to_string(), ui::StyleType::Error),
        };
        output.push_str(&format!(
            "\n\nTotal Value ({}): {}",
            ui::style_text("USD", ui::StyleType::TotalLabel),
            ui::style_text(&total, total_style)
        ));

        for value in self.balances.iter().filter(|v| v.error.is_some()) {
            output.push_str(&format!(
                "\n{}",
                ui::style_text(
                    &format!(
                        "#{}: {}",
                        value.balance.id,
                        value.error.as_deref().unwrap_or_default()
                    ),
                    ui::StyleType::Error
                )
            ));
        }

        output
    }
}

/// Records a fresh USD rate for every balance, concurrently, and prints the
/// resulting portfolio.
pub async fn run(ledger: &Ledger) -> Result<()> {
    let balances = ledger.balances().await?;
    if balances.is_empty() {
        println!("No balances yet. Add one with `fxledger balance add`.");
        return Ok(());
    }

    let pb = ui::new_progress_bar(balances.len() as u64, true);
    pb.set_message("Fetching USD rates...");

    let rate_futures = balances.into_iter().map(|balance| {
        let pb_clone = pb.clone();
        async move {
            let rate = ledger
                .usd_balance(balance.id)
                .await
                .map_err(|e| e.to_string());
            if let Err(e) = &rate {
                debug!("USD rate fetch failed for balance {}: {}", balance.id, e);
            }
            pb_clone.inc(1);
            (balance, rate)
        }
    });

    let rates = join_all(rate_futures).await;
    pb.finish_and_clear();

    println!("{}", PortfolioValue::from_rates(rates).display_as_table());
    Ok(())
}
