use tracing::warn;

use crate::repos::DynDataProvider;

use super::domain::{
    accounts::Account,
    reports::{summary_currency, AnalyticsReport, DashboardSummary, Period, Timeframe},
    transactions::{Transaction, TransactionFilter},
};

/// The period the dashboard's balance change is reported over.
pub const BALANCE_CHANGE_PERIOD: Period = Period::Month;

/// A service object providing access to accounts, transactions, and the
/// reports built from them.
#[derive(Clone)]
pub struct LedgerService {
    data_provider: DynDataProvider,
}

impl LedgerService {
    pub fn new(data_provider: DynDataProvider) -> Self {
        Self { data_provider }
    }

    pub async fn list_accounts(&self) -> anyhow::Result<Vec<Account>> {
        self.data_provider.list_accounts().await
    }

    pub async fn list_transactions(
        &self,
        filter: TransactionFilter,
    ) -> anyhow::Result<Vec<Transaction>> {
        self.data_provider.list_transactions(filter).await
    }

    /// Fetch all accounts and all transactions together.
    pub async fn dashboard_records(&self) -> anyhow::Result<(Vec<Account>, Vec<Transaction>)> {
        let accounts = self.data_provider.list_accounts().await?;
        let transactions = self
            .data_provider
            .list_transactions(TransactionFilter::default())
            .await?;

        Ok((accounts, transactions))
    }

    /// Build the summary shown on the main dashboard.
    ///
    /// The balance change is only included if the data provider has a
    /// snapshot of the total balance in the same currency as the accounts.
    pub async fn dashboard_summary(&self) -> anyhow::Result<DashboardSummary> {
        let (accounts, transactions) = self.dashboard_records().await?;
        let currency = summary_currency(&accounts, &transactions)?;

        let previous_balance = match self
            .data_provider
            .balance_snapshot(BALANCE_CHANGE_PERIOD)
            .await?
        {
            Some(snapshot) if snapshot.currency() == &currency => {
                Some((snapshot.value(), BALANCE_CHANGE_PERIOD))
            }
            Some(snapshot) => {
                warn!(
                    snapshot_currency = snapshot.currency().code(),
                    summary_currency = currency.code(),
                    "Ignoring balance snapshot in a different currency."
                );

                None
            }
            None => None,
        };

        Ok(DashboardSummary::assemble(
            &accounts,
            &transactions,
            previous_balance,
        )?)
    }

    /// Build the spending analysis for a timeframe.
    pub async fn analytics(&self, timeframe: Timeframe) -> anyhow::Result<AnalyticsReport> {
        let transactions = self
            .data_provider
            .list_transactions(TransactionFilter::default())
            .await?;

        Ok(AnalyticsReport::assemble(&transactions, timeframe)?)
    }
}
