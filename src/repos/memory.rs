use std::{collections::HashMap, path::Path};

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::{debug, info};

use crate::ledger::domain::{
    accounts::{Account, AccountKind},
    currency::{Currency, CurrencyAmount},
    reports::Period,
    transactions::{
        Merchant, Transaction, TransactionFilter, TransactionKind, TransactionStatus,
    },
};

use super::DataProvider;

/// A data provider backed by records held in memory.
///
/// The records never change after construction, so the store can be shared
/// freely between requests.
#[derive(Clone, Debug, Default)]
pub struct InMemoryStore {
    accounts: Vec<Account>,
    transactions: Vec<Transaction>,
    snapshots: HashMap<Period, CurrencyAmount>,
}

impl InMemoryStore {
    pub fn new(
        accounts: Vec<Account>,
        transactions: Vec<Transaction>,
        snapshots: HashMap<Period, CurrencyAmount>,
    ) -> Self {
        Self {
            accounts,
            transactions,
            snapshots,
        }
    }

    /// Create a store holding the demo accounts and transactions, with
    /// transaction dates relative to the current time.
    pub fn seeded() -> Self {
        Self::seeded_at(Utc::now())
    }

    /// Create a store holding the demo records as they would look at `now`.
    pub fn seeded_at(now: DateTime<Utc>) -> Self {
        use TransactionKind::*;
        use TransactionStatus::*;

        let usd = Currency::from_code("USD");
        let amount = |value: i64| CurrencyAmount::from_minor(usd.clone(), value);

        let accounts = vec![
            Account::new(
                "acc_1".to_owned(),
                "Main Account".to_owned(),
                AccountKind::Checking,
                amount(254783),
                now,
            ),
            Account::new(
                "acc_2".to_owned(),
                "Savings".to_owned(),
                AccountKind::Savings,
                amount(1575042),
                now,
            ),
            Account::new(
                "acc_3".to_owned(),
                "Credit Card".to_owned(),
                AccountKind::Credit,
                amount(-45019),
                now,
            ),
            Account::new(
                "acc_4".to_owned(),
                "Investment Portfolio".to_owned(),
                AccountKind::Investment,
                amount(832075),
                now,
            ),
        ];

        let seed = |id: &str,
                    account_id: &str,
                    value: i64,
                    description: &str,
                    category: &str,
                    days_ago: i64,
                    merchant: Option<&str>,
                    kind: TransactionKind,
                    status: TransactionStatus| Transaction {
            id: id.to_owned(),
            account_id: account_id.to_owned(),
            amount: amount(value),
            description: description.to_owned(),
            category: Some(category.to_owned()),
            date: now - Duration::days(days_ago),
            merchant: merchant.map(|name| Merchant {
                name: name.to_owned(),
                logo: None,
            }),
            kind,
            status,
        };

        #[rustfmt::skip]
        let transactions = vec![
            seed("tx_1", "acc_1", -8543, "Grocery Shopping", "Groceries", 2, Some("Whole Foods"), Expense, Completed),
            seed("tx_2", "acc_1", -3520, "Restaurant", "Dining", 3, Some("Chipotle"), Expense, Completed),
            seed("tx_3", "acc_1", 250000, "Salary", "Income", 7, Some("Employer Inc."), Income, Completed),
            seed("tx_4", "acc_1", -12050, "Electricity Bill", "Utilities", 5, None, Expense, Completed),
            seed("tx_5", "acc_1", -999, "Streaming Service", "Entertainment", 1, Some("Netflix"), Expense, Completed),
            seed("tx_6", "acc_1", -6530, "Gas Station", "Transportation", 4, Some("Shell"), Expense, Completed),
            seed("tx_7", "acc_3", -45019, "Credit Card Payment", "Debt", 6, None, Expense, Pending),
            seed("tx_8", "acc_2", 50000, "Savings Deposit", "Transfer", 8, None, Transfer, Completed),
        ];

        // Balances a month ago, ahead of the salary and savings deposit.
        let snapshots = HashMap::from([(Period::Month, amount(2566881))]);

        Self::new(accounts, transactions, snapshots)
    }

    /// Load records from a JSON fixture.
    ///
    /// The fixture is an object with `accounts`, `transactions`, and optional
    /// `snapshots` arrays, using the same field names as the API. Any malformed
    /// record, including an invalid timestamp, rejects the whole fixture.
    pub fn from_json_str(raw: &str) -> anyhow::Result<Self> {
        let fixture: Fixture = serde_json::from_str(raw).context("Malformed data fixture.")?;

        let accounts = fixture
            .accounts
            .into_iter()
            .map(AccountRecord::into_domain)
            .collect::<anyhow::Result<Vec<_>>>()?;
        let transactions = fixture
            .transactions
            .into_iter()
            .map(TransactionRecord::into_domain)
            .collect::<anyhow::Result<Vec<_>>>()?;
        let snapshots = fixture
            .snapshots
            .into_iter()
            .map(SnapshotRecord::into_domain)
            .collect::<anyhow::Result<HashMap<_, _>>>()?;

        Ok(Self::new(accounts, transactions, snapshots))
    }

    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read data fixture {}.", path.display()))?;
        let store = Self::from_json_str(&raw)
            .with_context(|| format!("Failed to load data fixture {}.", path.display()))?;

        info!(
            path = %path.display(),
            accounts = store.accounts.len(),
            transactions = store.transactions.len(),
            "Loaded data fixture."
        );

        Ok(store)
    }
}

#[async_trait]
impl DataProvider for InMemoryStore {
    async fn list_accounts(&self) -> anyhow::Result<Vec<Account>> {
        Ok(self.accounts.clone())
    }

    async fn list_transactions(
        &self,
        filter: TransactionFilter,
    ) -> anyhow::Result<Vec<Transaction>> {
        let transactions: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|transaction| filter.matches(transaction))
            .cloned()
            .collect();

        debug!(?filter, matched = transactions.len(), "Filtered transactions.");

        Ok(transactions)
    }

    async fn balance_snapshot(&self, period: Period) -> anyhow::Result<Option<CurrencyAmount>> {
        Ok(self.snapshots.get(&period).cloned())
    }
}

#[derive(Deserialize)]
struct Fixture {
    #[serde(default)]
    accounts: Vec<AccountRecord>,
    #[serde(default)]
    transactions: Vec<TransactionRecord>,
    #[serde(default)]
    snapshots: Vec<SnapshotRecord>,
}

/// An amount written either as a JSON number or as a decimal string.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(serde_json::Number),
    Text(String),
}

impl RawAmount {
    fn parse(&self, currency: Currency) -> anyhow::Result<CurrencyAmount> {
        let raw = match self {
            Self::Number(number) => number.to_string(),
            Self::Text(text) => text.to_owned(),
        };

        Ok(CurrencyAmount::from_str(currency, &raw)?)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountRecord {
    id: String,
    name: String,
    #[serde(rename = "type")]
    kind: String,
    balance: RawAmount,
    currency: String,
    last_updated: DateTime<Utc>,
}

impl AccountRecord {
    fn into_domain(self) -> anyhow::Result<Account> {
        let kind = self
            .kind
            .parse::<AccountKind>()
            .with_context(|| format!("Invalid account {}.", self.id))?;
        let balance = self
            .balance
            .parse(Currency::from_code(&self.currency))
            .with_context(|| format!("Invalid balance for account {}.", self.id))?;

        Ok(Account::new(self.id, self.name, kind, balance, self.last_updated))
    }
}

#[derive(Deserialize)]
struct MerchantRecord {
    name: String,
    logo: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionRecord {
    id: String,
    account_id: String,
    amount: RawAmount,
    currency: String,
    description: String,
    category: Option<String>,
    date: DateTime<Utc>,
    merchant: Option<MerchantRecord>,
    #[serde(rename = "type")]
    kind: String,
    status: String,
}

impl TransactionRecord {
    fn into_domain(self) -> anyhow::Result<Transaction> {
        let amount = self
            .amount
            .parse(Currency::from_code(&self.currency))
            .with_context(|| format!("Invalid amount for transaction {}.", self.id))?;
        let kind = self
            .kind
            .parse::<TransactionKind>()
            .with_context(|| format!("Invalid transaction {}.", self.id))?;
        let status = self
            .status
            .parse::<TransactionStatus>()
            .with_context(|| format!("Invalid transaction {}.", self.id))?;

        Ok(Transaction {
            id: self.id,
            account_id: self.account_id,
            amount,
            description: self.description,
            category: self.category.filter(|category| !category.is_empty()),
            date: self.date,
            merchant: self.merchant.map(|merchant| Merchant {
                name: merchant.name,
                logo: merchant.logo.filter(|logo| !logo.is_empty()),
            }),
            kind,
            status,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotRecord {
    period: String,
    total_balance: RawAmount,
    currency: String,
}

impl SnapshotRecord {
    fn into_domain(self) -> anyhow::Result<(Period, CurrencyAmount)> {
        let period = match self.period.as_str() {
            "day" => Period::Day,
            "week" => Period::Week,
            "month" => Period::Month,
            other => return Err(anyhow!("Unknown snapshot period {:?}.", other)),
        };
        let total_balance = self
            .total_balance
            .parse(Currency::from_code(&self.currency))
            .with_context(|| format!("Invalid {} snapshot.", self.period))?;

        Ok((period, total_balance))
    }
}

#[cfg(test)]
mod test {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn seeded_store_lists_all_records() {
        let store = InMemoryStore::seeded_at(now());

        let accounts = store.list_accounts().await.expect("accounts should list");
        let transactions = store
            .list_transactions(TransactionFilter::default())
            .await
            .expect("transactions should list");

        assert_eq!(4, accounts.len());
        assert_eq!(8, transactions.len());
        assert_eq!(now() - Duration::days(2), transactions[0].date);
    }

    #[tokio::test]
    async fn seeded_store_filters_by_account() {
        let store = InMemoryStore::seeded_at(now());

        let transactions = store
            .list_transactions(TransactionFilter::for_account("acc_3"))
            .await
            .expect("transactions should list");

        let ids: Vec<&str> = transactions.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(vec!["tx_7"], ids);
    }

    #[tokio::test]
    async fn seeded_store_has_month_snapshot() {
        let store = InMemoryStore::seeded_at(now());

        let snapshot = store
            .balance_snapshot(Period::Month)
            .await
            .expect("snapshot lookup should succeed");
        let missing = store
            .balance_snapshot(Period::Day)
            .await
            .expect("snapshot lookup should succeed");

        assert_eq!(Some(2566881), snapshot.map(|amount| amount.value()));
        assert_eq!(None, missing);
    }

    #[test]
    fn from_json_str_parses_fixture() {
        let raw = r#"{
            "accounts": [{
                "id": "acc_1",
                "name": "Main Account",
                "type": "checking",
                "balance": 2547.83,
                "currency": "USD",
                "lastUpdated": "2025-03-10T12:00:00Z"
            }],
            "transactions": [{
                "id": "tx_1",
                "accountId": "acc_1",
                "amount": "-85.43",
                "currency": "USD",
                "description": "Grocery Shopping",
                "category": "Groceries",
                "date": "2025-03-08T12:00:00.000Z",
                "merchant": {"name": "Whole Foods", "logo": ""},
                "type": "expense",
                "status": "completed"
            }],
            "snapshots": [{"period": "month", "totalBalance": 2047.83, "currency": "USD"}]
        }"#;

        let store = InMemoryStore::from_json_str(raw).expect("fixture should parse");

        assert_eq!(254783, store.accounts[0].balance().value());
        assert_eq!(AccountKind::Checking, store.accounts[0].kind());
        assert_eq!(-8543, store.transactions[0].amount.value());
        assert_eq!(
            Some(Merchant {
                name: "Whole Foods".to_owned(),
                logo: None
            }),
            store.transactions[0].merchant
        );
        assert_eq!(204783, store.snapshots[&Period::Month].value());
    }

    #[test]
    fn from_json_str_rejects_invalid_date() {
        let raw = r#"{
            "transactions": [{
                "id": "tx_1",
                "accountId": "acc_1",
                "amount": -1,
                "currency": "USD",
                "description": "Bad date",
                "date": "last tuesday",
                "type": "expense",
                "status": "completed"
            }]
        }"#;

        InMemoryStore::from_json_str(raw).expect_err("invalid dates should be rejected");
    }

    #[test]
    fn from_json_str_rejects_unknown_kind() {
        let raw = r#"{
            "accounts": [{
                "id": "acc_9",
                "name": "Mattress",
                "type": "cash",
                "balance": 10,
                "currency": "USD",
                "lastUpdated": "2025-03-10T12:00:00Z"
            }]
        }"#;

        InMemoryStore::from_json_str(raw).expect_err("unknown account kinds should be rejected");
    }
}
