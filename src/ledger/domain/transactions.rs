use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::currency::CurrencyAmount;

/// Label used for transactions that were never assigned a category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Which way money moved in a transaction.
///
/// Reports use the kind rather than the sign of the amount to decide whether a
/// transaction counts as income or spending.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TransactionKind {
    Income,
    Expense,
    Transfer,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TransactionStatus {
    Completed,
    Pending,
    Failed,
}

#[derive(Debug, Eq, Error, PartialEq)]
pub enum TransactionParseError {
    #[error("unknown transaction kind: {0:?}")]
    UnknownKind(String),
    #[error("unknown transaction status: {0:?}")]
    UnknownStatus(String),
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = TransactionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "transfer" => Ok(Self::Transfer),
            other => Err(TransactionParseError::UnknownKind(other.to_owned())),
        }
    }
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Pending => "pending",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = TransactionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "completed" => Ok(Self::Completed),
            "pending" => Ok(Self::Pending),
            "failed" => Ok(Self::Failed),
            other => Err(TransactionParseError::UnknownStatus(other.to_owned())),
        }
    }
}

/// The business on the other side of a transaction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Merchant {
    pub name: String,
    pub logo: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub account_id: String,
    pub amount: CurrencyAmount,
    pub description: String,
    pub category: Option<String>,
    pub date: DateTime<Utc>,
    pub merchant: Option<Merchant>,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
}

impl Transaction {
    /// The category label used when grouping, falling back to
    /// [`UNCATEGORIZED`].
    pub fn category_label(&self) -> &str {
        self.category.as_deref().unwrap_or(UNCATEGORIZED)
    }

    /// The name to show for the counterparty: the merchant if known,
    /// otherwise the description.
    pub fn display_name(&self) -> &str {
        self.merchant
            .as_ref()
            .map(|merchant| merchant.name.as_str())
            .unwrap_or(&self.description)
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }
}

/// Criteria for narrowing down a list of transactions. Empty criteria match
/// everything.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransactionFilter {
    /// Only include transactions from this account. Matched exactly.
    pub account_id: Option<String>,
    /// Case-insensitive text that must appear in the description, merchant
    /// name, or category.
    pub search: Option<String>,
    pub kind: Option<TransactionKind>,
    /// Only include transactions with this exact category label.
    pub category: Option<String>,
}

impl TransactionFilter {
    pub fn for_account(account_id: impl Into<String>) -> Self {
        Self {
            account_id: Some(account_id.into()),
            ..Default::default()
        }
    }

    pub fn matches(&self, transaction: &Transaction) -> bool {
        if let Some(account_id) = &self.account_id {
            if transaction.account_id != *account_id {
                return false;
            }
        }

        if let Some(kind) = self.kind {
            if transaction.kind != kind {
                return false;
            }
        }

        if let Some(category) = &self.category {
            if transaction.category_label() != category {
                return false;
            }
        }

        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(search) => {
                let needle = search.to_lowercase();
                let merchant_name = transaction
                    .merchant
                    .as_ref()
                    .map(|merchant| merchant.name.as_str())
                    .unwrap_or("");

                [
                    transaction.description.as_str(),
                    merchant_name,
                    transaction.category.as_deref().unwrap_or(""),
                ]
                .iter()
                .any(|haystack| haystack.to_lowercase().contains(&needle))
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test {
    use chrono::TimeZone;

    use super::*;
    use crate::ledger::domain::currency::Currency;

    pub(crate) fn transaction(
        id: &str,
        kind: TransactionKind,
        value: i64,
        category: Option<&str>,
        date: &str,
    ) -> Transaction {
        Transaction {
            id: id.to_owned(),
            account_id: "acc_1".to_owned(),
            amount: CurrencyAmount::from_minor(Currency::from_code("USD"), value),
            description: format!("Transaction {}", id),
            category: category.map(String::from),
            date: DateTime::parse_from_rfc3339(date)
                .expect("test dates should be valid")
                .with_timezone(&Utc),
            merchant: None,
            kind,
            status: TransactionStatus::Completed,
        }
    }

    fn grocery_run() -> Transaction {
        Transaction {
            id: "tx_1".to_owned(),
            account_id: "acc_1".to_owned(),
            amount: CurrencyAmount::from_minor(Currency::from_code("USD"), -8543),
            description: "Grocery Shopping".to_owned(),
            category: Some("Groceries".to_owned()),
            date: Utc.with_ymd_and_hms(2025, 3, 4, 12, 0, 0).unwrap(),
            merchant: Some(Merchant {
                name: "Whole Foods".to_owned(),
                logo: None,
            }),
            kind: TransactionKind::Expense,
            status: TransactionStatus::Completed,
        }
    }

    #[test]
    fn category_label_falls_back_to_uncategorized() {
        let t = transaction(
            "tx_1",
            TransactionKind::Expense,
            -100,
            None,
            "2025-01-01T00:00:00Z",
        );

        assert_eq!(UNCATEGORIZED, t.category_label());
    }

    #[test]
    fn display_name_prefers_merchant() {
        let mut t = grocery_run();
        assert_eq!("Whole Foods", t.display_name());

        t.merchant = None;
        assert_eq!("Grocery Shopping", t.display_name());
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(TransactionFilter::default().matches(&grocery_run()));
    }

    #[test]
    fn account_filter_is_case_sensitive() {
        let t = grocery_run();

        assert!(TransactionFilter::for_account("acc_1").matches(&t));
        assert!(!TransactionFilter::for_account("ACC_1").matches(&t));
        assert!(!TransactionFilter::for_account("acc_").matches(&t));
    }

    #[test]
    fn search_matches_merchant_case_insensitively() {
        let filter = TransactionFilter {
            search: Some("whole".to_owned()),
            ..Default::default()
        };

        assert!(filter.matches(&grocery_run()));
    }

    #[test]
    fn search_matches_category() {
        let filter = TransactionFilter {
            search: Some("GROC".to_owned()),
            ..Default::default()
        };

        assert!(filter.matches(&grocery_run()));
    }

    #[test]
    fn search_without_match_excludes() {
        let filter = TransactionFilter {
            search: Some("netflix".to_owned()),
            ..Default::default()
        };

        assert!(!filter.matches(&grocery_run()));
    }

    #[test]
    fn kind_and_category_filters_combine() {
        let filter = TransactionFilter {
            kind: Some(TransactionKind::Expense),
            category: Some("Groceries".to_owned()),
            ..Default::default()
        };
        let other_kind = TransactionFilter {
            kind: Some(TransactionKind::Income),
            ..filter.clone()
        };

        assert!(filter.matches(&grocery_run()));
        assert!(!other_kind.matches(&grocery_run()));
    }

    #[test]
    fn category_filter_matches_uncategorized_label() {
        let filter = TransactionFilter {
            category: Some(UNCATEGORIZED.to_owned()),
            ..Default::default()
        };
        let mut t = grocery_run();
        t.category = None;

        assert!(filter.matches(&t));
    }
}
