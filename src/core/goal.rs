//! Exchange goals and the figures derived from them.
//!
//! A goal watches one balance. Once the balance has grown by `threshold`
//! (a fraction, so `0.05` means 5%) relative to `initial_value`, some
//! evaluator may execute it: a transaction gets recorded and the goal is
//! marked completed. Deciding *when* to execute is left to the caller;
//! [`ExchangeGoal::is_triggered`] only answers whether the threshold has been
//! crossed right now.

use crate::core::balance::CurrencyBalance;
use crate::core::decimal::{FRACTION, MONEY};
use crate::core::error::{DivisionByZeroError, ValidationError};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalStatus {
    Pending,
    Executed {
        executed_at: DateTime<Utc>,
        transaction: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeGoal {
    pub id: u64,
    pub origin_balance: u64,
    pub destination_currency: String,
    pub initial_value: Decimal,
    pub threshold: Decimal,
    pub created_at: DateTime<Utc>,
    executed_at: Option<DateTime<Utc>>,
    completed: bool,
    transaction: Option<u64>,
}

impl ExchangeGoal {
    pub fn new(
        id: u64,
        origin_balance: u64,
        destination_currency: &str,
        initial_value: Decimal,
        threshold: Decimal,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id,
            origin_balance,
            destination_currency: destination_currency.to_string(),
            initial_value: MONEY.fit("initial_value", initial_value)?,
            threshold: FRACTION.fit("threshold", threshold)?,
            created_at,
            executed_at: None,
            completed: false,
            transaction: None,
        })
    }

    pub fn executed_at(&self) -> Option<DateTime<Utc>> {
        self.executed_at
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn transaction(&self) -> Option<u64> {
        self.transaction
    }

    pub fn status(&self) -> GoalStatus {
        match (self.transaction, self.executed_at) {
            (Some(transaction), Some(executed_at)) if self.completed => GoalStatus::Executed {
                executed_at,
                transaction,
            },
            _ => GoalStatus::Pending,
        }
    }

    /// Moves the goal from `Pending` to `Executed`. Returns `false` and
    /// leaves the goal untouched if it was already executed.
    pub fn execute(&mut self, transaction: u64, executed_at: DateTime<Utc>) -> bool {
        if self.status() != GoalStatus::Pending {
            return false;
        }
        self.transaction = Some(transaction);
        self.executed_at = Some(executed_at);
        self.completed = true;
        true
    }

    /// Threshold expressed as a percentage.
    pub fn percentage(&self) -> Decimal {
        self.threshold * dec!(100)
    }

    /// Absolute increase the threshold represents for the balance.
    pub fn increase(&self, origin_balance: &CurrencyBalance) -> Decimal {
        self.threshold * origin_balance.value
    }

    /// Signed change of the balance since the goal was created.
    pub fn difference_initial_value(&self, origin_balance: &CurrencyBalance) -> Decimal {
        origin_balance.value - self.initial_value
    }

    /// Signed change since creation as a percentage of the initial value.
    pub fn percentage_difference(
        &self,
        origin_balance: &CurrencyBalance,
    ) -> Result<Decimal, DivisionByZeroError> {
        self.difference_initial_value(origin_balance)
            .checked_div(self.initial_value)
            .map(|ratio| ratio * dec!(100))
            .ok_or(DivisionByZeroError)
    }

    /// Whether the balance has grown by at least the threshold percentage.
    /// A goal with a zero initial value never triggers.
    pub fn is_triggered(&self, origin_balance: &CurrencyBalance) -> bool {
        self.percentage_difference(origin_balance)
            .map(|change| change >= self.percentage())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balance_with_value(value: Decimal) -> CurrencyBalance {
        CurrencyBalance::new(1, "EUR", value, dec!(0.5), Utc::now()).unwrap()
    }

    fn goal(initial_value: Decimal, threshold: Decimal) -> ExchangeGoal {
        ExchangeGoal::new(1, 1, "BTC", initial_value, threshold, Utc::now()).unwrap()
    }

    #[test]
    fn test_percentage() {
        assert_eq!(goal(dec!(100), dec!(0.05)).percentage(), dec!(5));
    }

    #[test]
    fn test_increase() {
        let g = goal(dec!(100), dec!(0.10));
        assert_eq!(g.increase(&balance_with_value(dec!(200.00))), dec!(20.00));
    }

    #[test]
    fn test_difference_initial_value() {
        let g = goal(dec!(100), dec!(0.05));
        assert_eq!(g.difference_initial_value(&balance_with_value(dec!(150))), dec!(50));
        assert_eq!(g.difference_initial_value(&balance_with_value(dec!(80))), dec!(-20));
    }

    #[test]
    fn test_percentage_difference() {
        let g = goal(dec!(100), dec!(0.05));
        assert_eq!(
            g.percentage_difference(&balance_with_value(dec!(150))),
            Ok(dec!(50))
        );
        assert_eq!(
            g.percentage_difference(&balance_with_value(dec!(75))),
            Ok(dec!(-25))
        );
    }

    #[test]
    fn test_percentage_difference_zero_initial_value() {
        let g = goal(dec!(0), dec!(0.05));
        assert_eq!(
            g.percentage_difference(&balance_with_value(dec!(150))),
            Err(DivisionByZeroError)
        );
        assert!(!g.is_triggered(&balance_with_value(dec!(150))));
    }

    #[test]
    fn test_is_triggered_at_threshold() {
        let g = goal(dec!(100), dec!(0.05));
        assert!(!g.is_triggered(&balance_with_value(dec!(104.99))));
        assert!(g.is_triggered(&balance_with_value(dec!(105))));
        assert!(g.is_triggered(&balance_with_value(dec!(130))));
    }

    #[test]
    fn test_execute_transitions_once() {
        let mut g = goal(dec!(100), dec!(0.05));
        assert_eq!(g.status(), GoalStatus::Pending);
        assert!(!g.completed());
        assert!(g.transaction().is_none());

        let at = Utc::now();
        assert!(g.execute(42, at));
        assert_eq!(
            g.status(),
            GoalStatus::Executed {
                executed_at: at,
                transaction: 42
            }
        );
        assert!(g.completed());
        assert_eq!(g.executed_at(), Some(at));

        assert!(!g.execute(43, Utc::now()));
        assert_eq!(g.transaction(), Some(42));
    }

    #[test]
    fn test_serialized_field_names() {
        let g = goal(dec!(100), dec!(0.05));
        let json = serde_json::to_value(&g).unwrap();
        for field in [
            "origin_balance",
            "destination_currency",
            "initial_value",
            "threshold",
            "created_at",
            "executed_at",
            "completed",
            "transaction",
        ] {
            assert!(json.get(field).is_some(), "missing field {field}");
        }
        assert_eq!(json["completed"], false);
        assert!(json["transaction"].is_null());
    }
}
