use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::currency::CurrencyAmount;

/// The kind of financial account.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AccountKind {
    Checking,
    Savings,
    Credit,
    Investment,
}

#[derive(Debug, Eq, Error, PartialEq)]
#[error("unknown account kind: {0:?}")]
pub struct AccountKindParseError(String);

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Checking => "checking",
            Self::Savings => "savings",
            Self::Credit => "credit",
            Self::Investment => "investment",
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountKind {
    type Err = AccountKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "checking" => Ok(Self::Checking),
            "savings" => Ok(Self::Savings),
            "credit" => Ok(Self::Credit),
            "investment" => Ok(Self::Investment),
            other => Err(AccountKindParseError(other.to_owned())),
        }
    }
}

/// A financial account and its current balance.
#[derive(Clone, Debug, PartialEq)]
pub struct Account {
    id: String,
    name: String,
    kind: AccountKind,
    balance: CurrencyAmount,
    last_updated: DateTime<Utc>,
}

impl Account {
    /// Construct a new account.
    ///
    /// # Arguments
    /// * `id` - The account's unique identifier.
    /// * `name` - Display name of the account.
    /// * `kind` - What type of account this is.
    /// * `balance` - The current balance. Credit accounts typically carry a
    ///   negative balance.
    /// * `last_updated` - When the balance was last refreshed.
    pub fn new(
        id: String,
        name: String,
        kind: AccountKind,
        balance: CurrencyAmount,
        last_updated: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            balance,
            last_updated,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> AccountKind {
        self.kind
    }

    pub fn balance(&self) -> &CurrencyAmount {
        &self.balance
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }
}
