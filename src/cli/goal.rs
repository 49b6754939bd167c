use super::{parse_symbol, ui};
use crate::core::{CurrencyBalance, ExchangeGoal, GoalStatus, Ledger};
use anyhow::{Context, Result};
use clap::Subcommand;
use comfy_table::Cell;
use rust_decimal::Decimal;

#[derive(Debug, Subcommand)]
pub enum GoalCommand {
    /// Watch a balance and exchange it once it grows by a threshold
    Add {
        balance_id: u64,
        #[arg(value_parser = parse_symbol)]
        destination: String,
        /// Growth that triggers the goal, as a fraction (0.05 = 5%)
        #[arg(long)]
        threshold: Decimal,
        /// Reference value; defaults to the balance's current value
        #[arg(long)]
        initial_value: Option<Decimal>,
    },
    /// List goals with their progress
    List,
    /// Exchange the goal's balance now and mark the goal completed
    Execute {
        id: u64,
        /// Amount received in the destination currency
        #[arg(long)]
        destination_value: Decimal,
        #[arg(long)]
        commission: Option<Decimal>,
    },
    /// Mark a goal completed by an already recorded transaction
    Link { id: u64, transaction_id: u64 },
    /// Remove a goal
    Remove { id: u64 },
}

pub async fn run(command: GoalCommand, ledger: &Ledger) -> Result<()> {
    match command {
        GoalCommand::Add {
            balance_id,
            destination,
            threshold,
            initial_value,
        } => {
            let goal = ledger
                .create_goal(balance_id, &destination, threshold, initial_value)
                .await?;
            println!(
                "Created goal #{}: exchange balance #{} into {} at +{}%",
                goal.id,
                goal.origin_balance,
                goal.destination_currency,
                ui::fixed(goal.percentage(), 2)
            );
        }
        GoalCommand::List => {
            let mut rows = Vec::new();
            for goal in ledger.goals().await? {
                let balance = ledger
                    .balance(goal.origin_balance)
                    .await?
                    .with_context(|| format!("Balance of goal #{} is missing", goal.id))?;
                rows.push((goal, balance));
            }
            println!("{}", goals_table(&rows));
        }
        GoalCommand::Execute {
            id,
            destination_value,
            commission,
        } => {
            let (goal, tx) = ledger.execute_goal(id, destination_value, commission).await?;
            println!(
                "Executed goal #{} with transaction #{}: {} {} -> {} {}",
                goal.id,
                tx.id,
                tx.original_currency_value,
                tx.origin_currency,
                tx.destination_currency_value,
                tx.destination_currency
            );
        }
        GoalCommand::Link { id, transaction_id } => {
            let goal = ledger.link_transaction(id, transaction_id).await?;
            println!("Goal #{} completed by transaction #{transaction_id}", goal.id);
        }
        GoalCommand::Remove { id } => {
            ledger.delete_goal(id).await?;
            println!("Removed goal #{id}");
        }
    }
    Ok(())
}

pub fn goals_table(rows: &[(ExchangeGoal, CurrencyBalance)]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("#"),
        ui::header_cell("Balance"),
        ui::header_cell("To"),
        ui::header_cell("Initial"),
        ui::header_cell("Threshold"),
        ui::header_cell("Increase"),
        ui::header_cell("Difference"),
        ui::header_cell("Change"),
        ui::header_cell("Status"),
    ]);

    for (goal, balance) in rows {
        let status = match goal.status() {
            GoalStatus::Executed {
                executed_at,
                transaction,
            } => format!(
                "executed {} (tx #{transaction})",
                executed_at.format("%Y-%m-%d")
            ),
            GoalStatus::Pending if goal.is_triggered(balance) => {
                ui::style_text("triggered", ui::StyleType::TotalValue)
            }
            GoalStatus::Pending => "pending".to_string(),
        };

        table.add_row(vec![
            ui::number_cell(goal.id),
            Cell::new(balance.to_string()),
            Cell::new(&goal.destination_currency),
            ui::number_cell(ui::fixed(goal.initial_value, 2)),
            ui::number_cell(format!("{}%", ui::fixed(goal.percentage(), 2))),
            ui::number_cell(ui::fixed(goal.increase(balance), 2)),
            ui::number_cell(ui::fixed(goal.difference_initial_value(balance), 2)),
            goal.percentage_difference(balance)
                .map_or_else(|_| ui::na_cell(false), ui::change_cell),
            Cell::new(status),
        ]);
    }
    table.to_string()
}
