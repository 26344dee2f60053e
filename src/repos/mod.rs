mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::ledger::domain::{
    accounts::Account,
    currency::CurrencyAmount,
    reports::Period,
    transactions::{Transaction, TransactionFilter},
};

pub use memory::InMemoryStore;

pub type DynDataProvider = Arc<dyn DataProvider + Send + Sync>;

/// Read-only access to account and transaction records.
#[async_trait]
pub trait DataProvider {
    /// List every account.
    async fn list_accounts(&self) -> anyhow::Result<Vec<Account>>;

    /// List the transactions matching the provided filter.
    ///
    /// # Arguments
    ///
    /// * `filter` - Criteria the returned transactions must satisfy. The
    ///   default filter returns all transactions.
    ///
    /// # Returns
    ///
    /// An [`anyhow::Result`] containing the matching transactions in the order
    /// the provider stores them.
    async fn list_transactions(&self, filter: TransactionFilter)
        -> anyhow::Result<Vec<Transaction>>;

    /// Get the total balance across all accounts as it stood at the start of
    /// a period.
    ///
    /// Returns [`None`] if the provider has no history for the period.
    async fn balance_snapshot(&self, period: Period) -> anyhow::Result<Option<CurrencyAmount>>;
}
