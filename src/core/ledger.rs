//! The persistence boundary for every record type.
//!
//! The store underneath is a plain key-value store, so the ledger is where
//! the relational rules live: unique currency symbols, references that must
//! exist, cascading deletes and the one-to-one link between a goal and the
//! transaction that executed it. Compound writes are serialised behind a
//! single async mutex; reads go straight to the store.

use crate::core::balance::CurrencyBalance;
use crate::core::currency::{Currency, UsdRateProvider};
use crate::core::decimal::RATE;
use crate::core::error::LedgerError;
use crate::core::goal::ExchangeGoal;
use crate::core::history::CurrencyHistory;
use crate::core::transaction::{NewTransaction, Transaction};
use crate::store::{Collection, Store};
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument};

const CURRENCIES: &str = "currencies";
const TRANSACTIONS: &str = "transactions";
const HISTORY: &str = "currency_history";
const BALANCES: &str = "currency_balances";
const GOALS: &str = "exchange_goals";
const SEQUENCES: &str = "sequences";

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Number of records removed by a delete, per record type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub currencies: usize,
    pub transactions: usize,
    pub histories: usize,
    pub balances: usize,
    pub goals: usize,
}

impl CascadeReport {
    pub fn total(&self) -> usize {
        self.currencies + self.transactions + self.histories + self.balances + self.goals
    }
}

pub struct Ledger {
    currencies: Arc<dyn Collection<String, Currency>>,
    transactions: Arc<dyn Collection<u64, Transaction>>,
    history: Arc<dyn Collection<u64, CurrencyHistory>>,
    balances: Arc<dyn Collection<u64, CurrencyBalance>>,
    goals: Arc<dyn Collection<u64, ExchangeGoal>>,
    sequences: Arc<dyn Collection<String, u64>>,
    rates: Arc<dyn UsdRateProvider>,
    write_lock: Mutex<()>,
}

impl Ledger {
    pub fn open<S: Store>(store: &S, rates: Arc<dyn UsdRateProvider>) -> Result<Self> {
        Ok(Self {
            currencies: store.collection(CURRENCIES)?,
            transactions: store.collection(TRANSACTIONS)?,
            history: store.collection(HISTORY)?,
            balances: store.collection(BALANCES)?,
            goals: store.collection(GOALS)?,
            sequences: store.collection(SEQUENCES)?,
            rates,
            write_lock: Mutex::new(()),
        })
    }

    /// Next id for `table`. Callers must hold the write lock.
    async fn next_id(&self, table: &str) -> Result<u64> {
        let key = table.to_string();
        let next = self.sequences.get(&key).await?.unwrap_or(0) + 1;
        self.sequences.put(key, next).await?;
        Ok(next)
    }

    // ── Currencies ──────────────────────────────────────────────────

    pub async fn add_currency(&self, currency: Currency) -> Result<Currency> {
        let _guard = self.write_lock.lock().await;
        if self.currencies.get(&currency.symbol).await?.is_some() {
            return Err(LedgerError::DuplicateSymbol(currency.symbol));
        }
        self.currencies
            .put(currency.symbol.clone(), currency.clone())
            .await?;
        info!(symbol = %currency.symbol, "Added currency");
        Ok(currency)
    }

    pub async fn currency(&self, symbol: &str) -> Result<Option<Currency>> {
        Ok(self.currencies.get(&symbol.to_string()).await?)
    }

    pub async fn currencies(&self) -> Result<Vec<Currency>> {
        let mut currencies = self.currencies.values().await?;
        currencies.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        Ok(currencies)
    }

    pub async fn set_currency_usd_value(&self, symbol: &str, usd_value: Decimal) -> Result<Currency> {
        let _guard = self.write_lock.lock().await;
        let currency = self.require_currency(symbol).await?.with_usd_value(usd_value)?;
        self.currencies
            .put(currency.symbol.clone(), currency.clone())
            .await?;
        Ok(currency)
    }

    /// Deletes a currency together with everything that refers to it.
    pub async fn delete_currency(&self, symbol: &str) -> Result<CascadeReport> {
        let _guard = self.write_lock.lock().await;
        self.require_currency(symbol).await?;

        let mut report = CascadeReport::default();

        let balance_ids: HashSet<u64> = self
            .balances
            .values()
            .await?
            .into_iter()
            .filter(|b| b.currency == symbol)
            .map(|b| b.id)
            .collect();
        let transaction_ids: HashSet<u64> = self
            .transactions
            .values()
            .await?
            .into_iter()
            .filter(|t| t.origin_currency == symbol || t.destination_currency == symbol)
            .map(|t| t.id)
            .collect();

        report.goals = self
            .remove_goals_where(|g| {
                balance_ids.contains(&g.origin_balance)
                    || g.destination_currency == symbol
                    || g.transaction().is_some_and(|t| transaction_ids.contains(&t))
            })
            .await?;

        for history in self.history.values().await? {
            if history.symbol == symbol && self.history.remove(&history.id).await? {
                report.histories += 1;
            }
        }
        for id in &balance_ids {
            if self.balances.remove(id).await? {
                report.balances += 1;
            }
        }
        for id in &transaction_ids {
            if self.transactions.remove(id).await? {
                report.transactions += 1;
            }
        }
        if self.currencies.remove(&symbol.to_string()).await? {
            report.currencies += 1;
        }

        info!(%symbol, removed = report.total(), "Deleted currency");
        Ok(report)
    }

    // ── Currency history ────────────────────────────────────────────

    /// Fetches the live USD quote for `symbol` and appends it to the
    /// currency's history. Nothing is written when the fetch fails.
    #[instrument(skip(self))]
    pub async fn fetch_and_record(&self, symbol: &str) -> Result<CurrencyHistory> {
        self.require_currency(symbol).await?;

        let ask = self.rates.usd_ask(symbol).await?;
        let usd_value = RATE.fit("usd_value", ask)?;
        debug!(provider = self.rates.name(), %usd_value, "Fetched USD rate");

        let _guard = self.write_lock.lock().await;
        // The currency may have been deleted while the quote was in flight.
        self.require_currency(symbol).await?;
        let id = self.next_id(HISTORY).await?;
        let record = CurrencyHistory::new(id, symbol, usd_value, Utc::now());
        self.history.put(id, record.clone()).await?;
        info!(%symbol, %usd_value, id, "Recorded currency rate");
        Ok(record)
    }

    /// Snapshots for `symbol`, oldest first.
    pub async fn history(&self, symbol: &str) -> Result<Vec<CurrencyHistory>> {
        let mut records: Vec<_> = self
            .history
            .values()
            .await?
            .into_iter()
            .filter(|h| h.symbol == symbol)
            .collect();
        records.sort_by_key(|h| (h.created_at, h.id));
        Ok(records)
    }

    pub async fn latest_rate(&self, symbol: &str) -> Result<Option<CurrencyHistory>> {
        Ok(self.history(symbol).await?.pop())
    }

    // ── Balances ────────────────────────────────────────────────────

    pub async fn add_balance(
        &self,
        symbol: &str,
        value: Decimal,
        share_portfolio: Decimal,
    ) -> Result<CurrencyBalance> {
        let _guard = self.write_lock.lock().await;
        self.require_currency(symbol).await?;
        let id = self.next_id(BALANCES).await?;
        let balance = CurrencyBalance::new(id, symbol, value, share_portfolio, Utc::now())?;
        self.balances.put(id, balance.clone()).await?;
        info!(%balance, id, "Added balance");
        Ok(balance)
    }

    pub async fn balance(&self, id: u64) -> Result<Option<CurrencyBalance>> {
        Ok(self.balances.get(&id).await?)
    }

    pub async fn balances(&self) -> Result<Vec<CurrencyBalance>> {
        let mut balances = self.balances.values().await?;
        balances.sort_by_key(|b| b.id);
        Ok(balances)
    }

    pub async fn update_balance(
        &self,
        id: u64,
        value: Option<Decimal>,
        share_portfolio: Option<Decimal>,
    ) -> Result<CurrencyBalance> {
        let _guard = self.write_lock.lock().await;
        let mut balance = self.require_balance(id).await?;
        if let Some(value) = value {
            balance.set_value(value)?;
        }
        if let Some(share) = share_portfolio {
            balance.set_share_portfolio(share)?;
        }
        self.balances.put(id, balance.clone()).await?;
        Ok(balance)
    }

    pub async fn delete_balance(&self, id: u64) -> Result<CascadeReport> {
        let _guard = self.write_lock.lock().await;
        self.require_balance(id).await?;
        let goals = self.remove_goals_where(|g| g.origin_balance == id).await?;
        self.balances.remove(&id).await?;
        Ok(CascadeReport {
            balances: 1,
            goals,
            ..Default::default()
        })
    }

    /// Fetches and records a fresh USD rate for the balance's currency and
    /// returns it. Every call appends one history row.
    #[instrument(skip(self))]
    pub async fn usd_balance(&self, id: u64) -> Result<Decimal> {
        let balance = self.require_balance(id).await?;
        let record = self.fetch_and_record(&balance.currency).await?;
        Ok(record.usd_value)
    }

    /// The most recently recorded USD rate for the balance's currency,
    /// without touching the network.
    pub async fn last_usd_balance(&self, id: u64) -> Result<Option<Decimal>> {
        let balance = self.require_balance(id).await?;
        Ok(self
            .latest_rate(&balance.currency)
            .await?
            .map(|h| h.usd_value))
    }

    // ── Transactions ────────────────────────────────────────────────

    pub async fn record_transaction(&self, new: NewTransaction) -> Result<Transaction> {
        let _guard = self.write_lock.lock().await;
        self.insert_transaction(new).await
    }

    /// Inserts a transaction. Callers must hold the write lock.
    async fn insert_transaction(&self, new: NewTransaction) -> Result<Transaction> {
        self.require_currency(&new.origin_currency).await?;
        self.require_currency(&new.destination_currency).await?;
        let id = self.next_id(TRANSACTIONS).await?;
        let transaction = new.into_transaction(id, Utc::now())?;
        self.transactions.put(id, transaction.clone()).await?;
        info!(
            id,
            origin = %transaction.origin_currency,
            destination = %transaction.destination_currency,
            "Recorded transaction"
        );
        Ok(transaction)
    }

    pub async fn transaction(&self, id: u64) -> Result<Option<Transaction>> {
        Ok(self.transactions.get(&id).await?)
    }

    pub async fn transactions(&self) -> Result<Vec<Transaction>> {
        let mut transactions = self.transactions.values().await?;
        transactions.sort_by_key(|t| t.id);
        Ok(transactions)
    }

    /// Deletes a transaction and the goal it executed, if any.
    pub async fn delete_transaction(&self, id: u64) -> Result<CascadeReport> {
        let _guard = self.write_lock.lock().await;
        self.require_transaction(id).await?;
        let goals = self
            .remove_goals_where(|g| g.transaction() == Some(id))
            .await?;
        self.transactions.remove(&id).await?;
        Ok(CascadeReport {
            transactions: 1,
            goals,
            ..Default::default()
        })
    }

    // ── Exchange goals ──────────────────────────────────────────────

    /// Creates a pending goal. `initial_value` defaults to the balance's
    /// current value.
    pub async fn create_goal(
        &self,
        balance_id: u64,
        destination_currency: &str,
        threshold: Decimal,
        initial_value: Option<Decimal>,
    ) -> Result<ExchangeGoal> {
        let _guard = self.write_lock.lock().await;
        let balance = self.require_balance(balance_id).await?;
        self.require_currency(destination_currency).await?;

        let id = self.next_id(GOALS).await?;
        let goal = ExchangeGoal::new(
            id,
            balance_id,
            destination_currency,
            initial_value.unwrap_or(balance.value),
            threshold,
            Utc::now(),
        )?;
        self.goals.put(id, goal.clone()).await?;
        info!(id, balance_id, destination = %destination_currency, "Created exchange goal");
        Ok(goal)
    }

    pub async fn goal(&self, id: u64) -> Result<Option<ExchangeGoal>> {
        Ok(self.goals.get(&id).await?)
    }

    pub async fn goals(&self) -> Result<Vec<ExchangeGoal>> {
        let mut goals = self.goals.values().await?;
        goals.sort_by_key(|g| g.id);
        Ok(goals)
    }

    pub async fn delete_goal(&self, id: u64) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        if !self.goals.remove(&id).await? {
            return Err(LedgerError::not_found("Exchange goal", id));
        }
        Ok(())
    }

    /// Executes a pending goal: records the exchange of the whole origin
    /// balance into the goal's destination currency and links it.
    pub async fn execute_goal(
        &self,
        id: u64,
        destination_value: Decimal,
        commission: Option<Decimal>,
    ) -> Result<(ExchangeGoal, Transaction)> {
        let _guard = self.write_lock.lock().await;
        let goal = self.require_pending_goal(id).await?;
        let balance = self.require_balance(goal.origin_balance).await?;

        let mut new = NewTransaction::new(
            &balance.currency,
            &goal.destination_currency,
            balance.value,
            destination_value,
        );
        if let Some(commission) = commission {
            new = new.with_commission(commission);
        }
        let transaction = self.insert_transaction(new).await?;
        match self.mark_executed(goal, &transaction).await {
            Ok(goal) => Ok((goal, transaction)),
            Err(e) => {
                // The goal stays pending, so its transaction must not survive.
                if let Err(undo) = self.transactions.remove(&transaction.id).await {
                    error!(
                        id = transaction.id,
                        error = %undo,
                        "Failed to roll back transaction of unexecuted goal"
                    );
                }
                Err(e)
            }
        }
    }

    /// Marks a pending goal executed by an already recorded transaction.
    pub async fn link_transaction(&self, id: u64, transaction_id: u64) -> Result<ExchangeGoal> {
        let _guard = self.write_lock.lock().await;
        let goal = self.require_pending_goal(id).await?;
        let transaction = self.require_transaction(transaction_id).await?;
        let already_linked = self
            .goals
            .values()
            .await?
            .iter()
            .any(|g| g.transaction() == Some(transaction_id));
        if already_linked {
            return Err(LedgerError::TransactionAlreadyLinked(transaction_id));
        }
        self.mark_executed(goal, &transaction).await
    }

    async fn mark_executed(
        &self,
        mut goal: ExchangeGoal,
        transaction: &Transaction,
    ) -> Result<ExchangeGoal> {
        if !goal.execute(transaction.id, transaction.exchange_date) {
            return Err(LedgerError::GoalAlreadyExecuted(goal.id));
        }
        self.goals.put(goal.id, goal.clone()).await?;
        info!(id = goal.id, transaction = transaction.id, "Executed exchange goal");
        Ok(goal)
    }

    // ── Helpers ─────────────────────────────────────────────────────

    async fn remove_goals_where<F>(&self, predicate: F) -> Result<usize>
    where
        F: Fn(&ExchangeGoal) -> bool,
    {
        let mut removed = 0;
        for goal in self.goals.values().await? {
            if predicate(&goal) && self.goals.remove(&goal.id).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    pub(crate) async fn require_currency(&self, symbol: &str) -> Result<Currency> {
        self.currency(symbol)
            .await?
            .ok_or_else(|| LedgerError::not_found("Currency", symbol))
    }

    async fn require_balance(&self, id: u64) -> Result<CurrencyBalance> {
        self.balance(id)
            .await?
            .ok_or_else(|| LedgerError::not_found("Currency balance", id))
    }

    async fn require_transaction(&self, id: u64) -> Result<Transaction> {
        self.transaction(id)
            .await?
            .ok_or_else(|| LedgerError::not_found("Transaction", id))
    }

    async fn require_pending_goal(&self, id: u64) -> Result<ExchangeGoal> {
        let goal = self
            .goal(id)
            .await?
            .ok_or_else(|| LedgerError::not_found("Exchange goal", id))?;
        if goal.completed() {
            return Err(LedgerError::GoalAlreadyExecuted(id));
        }
        Ok(goal)
    }
}
