//! JSON representations of ledger data.
//!
//! Amounts are rendered as decimal strings using the currency's minor units,
//! alongside a display string such as `$2,547.83`.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::ledger::domain::{
    self,
    currency::Currency,
    formatting::{format_currency, format_date, format_percentage, DEFAULT_DATE_FORMAT},
    reports::{SavingsAssessment, SAVINGS_RATE_TARGET},
};

#[derive(Clone, Debug, Serialize)]
pub struct CurrencyAmount {
    pub currency: String,
    pub value: String,
    pub formatted: String,
}

impl CurrencyAmount {
    pub fn new(currency: &Currency, value: i64) -> Self {
        Self::from(&domain::currency::CurrencyAmount::from_minor(
            currency.clone(),
            value,
        ))
    }
}

impl From<&domain::currency::CurrencyAmount> for CurrencyAmount {
    fn from(amount: &domain::currency::CurrencyAmount) -> Self {
        Self {
            currency: amount.currency().code().to_owned(),
            value: amount.format_value(),
            formatted: format_currency(amount),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub balance: String,
    pub formatted_balance: String,
    pub currency: String,
    pub last_updated: DateTime<Utc>,
}

impl From<&domain::accounts::Account> for Account {
    fn from(account: &domain::accounts::Account) -> Self {
        Self {
            id: account.id().to_owned(),
            name: account.name().to_owned(),
            kind: account.kind().as_str(),
            balance: account.balance().format_value(),
            formatted_balance: format_currency(account.balance()),
            currency: account.balance().currency().code().to_owned(),
            last_updated: account.last_updated(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Merchant {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub account_id: String,
    pub amount: String,
    pub formatted_amount: String,
    pub currency: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub date: DateTime<Utc>,
    pub formatted_date: String,
    /// Merchant name if known, otherwise the description.
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant: Option<Merchant>,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub status: &'static str,
}

impl From<&domain::transactions::Transaction> for Transaction {
    fn from(transaction: &domain::transactions::Transaction) -> Self {
        Self {
            id: transaction.id.clone(),
            account_id: transaction.account_id.clone(),
            amount: transaction.amount.format_value(),
            formatted_amount: format_currency(&transaction.amount),
            currency: transaction.amount.currency().code().to_owned(),
            description: transaction.description.clone(),
            category: transaction.category.clone(),
            date: transaction.date,
            formatted_date: format_date(&transaction.date, DEFAULT_DATE_FORMAT),
            display_name: transaction.display_name().to_owned(),
            merchant: transaction.merchant.as_ref().map(|merchant| Merchant {
                name: merchant.name.clone(),
                logo: merchant.logo.clone(),
            }),
            kind: transaction.kind.as_str(),
            status: transaction.status.as_str(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardRecords {
    pub accounts: Vec<Account>,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceChange {
    pub amount: CurrencyAmount,
    pub percentage: f64,
    pub formatted_percentage: String,
    pub period: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryShare {
    pub category: String,
    pub amount: CurrencyAmount,
    pub count: usize,
    pub percentage: f64,
    pub formatted_percentage: String,
}

impl CategoryShare {
    fn new(currency: &Currency, share: &domain::reports::CategoryShare) -> Self {
        Self {
            category: share.category.clone(),
            amount: CurrencyAmount::new(currency, share.total),
            count: share.count,
            percentage: share.percentage,
            formatted_percentage: format_percentage(share.percentage),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub currency: String,
    pub total_balance: CurrencyAmount,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_change: Option<BalanceChange>,
    pub total_income: CurrencyAmount,
    pub total_spending: CurrencyAmount,
    pub savings_rate: f64,
    pub pending_count: usize,
    pub categories: Vec<CategoryShare>,
    pub recent_transactions: Vec<Transaction>,
}

impl From<&domain::reports::DashboardSummary> for DashboardSummary {
    fn from(summary: &domain::reports::DashboardSummary) -> Self {
        let currency = &summary.currency;

        Self {
            currency: currency.code().to_owned(),
            total_balance: CurrencyAmount::new(currency, summary.total_balance),
            balance_change: summary.balance_change.as_ref().map(|change| BalanceChange {
                amount: CurrencyAmount::new(currency, change.amount),
                percentage: change.percentage,
                formatted_percentage: format_percentage(change.percentage),
                period: change.period.as_str(),
            }),
            total_income: CurrencyAmount::new(currency, summary.cash_flow.total_income),
            total_spending: CurrencyAmount::new(currency, summary.cash_flow.total_spending),
            savings_rate: summary.cash_flow.savings_rate,
            pending_count: summary.pending_count,
            categories: summary
                .cash_flow
                .categories
                .iter()
                .map(|share| CategoryShare::new(currency, share))
                .collect(),
            recent_transactions: summary
                .recent_transactions
                .iter()
                .map(Transaction::from)
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TimeBucket {
    pub key: String,
    pub amount: CurrencyAmount,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Savings {
    BelowTarget,
    OnTrack,
}

impl From<SavingsAssessment> for Savings {
    fn from(assessment: SavingsAssessment) -> Self {
        match assessment {
            SavingsAssessment::BelowTarget => Self::BelowTarget,
            SavingsAssessment::OnTrack => Self::OnTrack,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    pub top_category: Option<CategoryShare>,
    pub savings: Savings,
    pub savings_rate_target: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub currency: String,
    pub timeframe: &'static str,
    pub total_income: CurrencyAmount,
    pub total_spending: CurrencyAmount,
    pub savings_rate: f64,
    pub categories: Vec<CategoryShare>,
    pub spending_over_time: Vec<TimeBucket>,
    pub insights: Insights,
}

impl From<&domain::reports::AnalyticsReport> for AnalyticsReport {
    fn from(report: &domain::reports::AnalyticsReport) -> Self {
        let currency = &report.currency;

        Self {
            currency: currency.code().to_owned(),
            timeframe: report.timeframe.as_str(),
            total_income: CurrencyAmount::new(currency, report.cash_flow.total_income),
            total_spending: CurrencyAmount::new(currency, report.cash_flow.total_spending),
            savings_rate: report.cash_flow.savings_rate,
            categories: report
                .cash_flow
                .categories
                .iter()
                .map(|share| CategoryShare::new(currency, share))
                .collect(),
            spending_over_time: report
                .spending_over_time
                .buckets()
                .iter()
                .map(|bucket| TimeBucket {
                    key: bucket.key.to_string(),
                    amount: CurrencyAmount::new(currency, bucket.total),
                })
                .collect(),
            insights: Insights {
                top_category: report
                    .insights
                    .top_category
                    .as_ref()
                    .map(|share| CategoryShare::new(currency, share)),
                savings: report.insights.savings.into(),
                savings_rate_target: SAVINGS_RATE_TARGET,
            },
        }
    }
}
