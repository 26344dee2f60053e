//! Derived values for the dashboard.
//!
//! Every function here is a pure computation over slices of accounts and
//! transactions. Nothing is cached; callers recompute from the raw records on
//! each request.

use std::{collections::HashMap, fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

use super::{
    accounts::Account,
    currency::Currency,
    transactions::{Transaction, TransactionStatus},
};

/// Savings rate, as a percentage of income, that the analytics insights treat
/// as healthy.
pub const SAVINGS_RATE_TARGET: f64 = 20.0;

/// Number of transactions included in a dashboard summary's recent activity.
pub const RECENT_TRANSACTION_LIMIT: usize = 5;

/// Total spending for a single category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategorySummary {
    pub category: String,
    /// Sum of the absolute amounts, in minor units.
    pub total: i64,
    pub count: usize,
}

/// Group transactions by category and total their absolute amounts.
///
/// Transactions without a category are grouped under
/// [`UNCATEGORIZED`][super::transactions::UNCATEGORIZED]. The result is
/// sorted by total, largest first. Categories with equal totals keep the order
/// in which they were first encountered.
pub fn summarize_by_category<'a, I>(transactions: I) -> Vec<CategorySummary>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut summaries: Vec<CategorySummary> = vec![];
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for transaction in transactions {
        let label = transaction.category_label();
        let position = *positions.entry(label).or_insert_with(|| {
            summaries.push(CategorySummary {
                category: label.to_owned(),
                total: 0,
                count: 0,
            });

            summaries.len() - 1
        });

        let summary = &mut summaries[position];
        summary.total = summary.total.saturating_add(transaction.amount.abs());
        summary.count += 1;
    }

    // `sort_by` is stable, which keeps ties in encounter order.
    summaries.sort_by(|a, b| b.total.cmp(&a.total));

    summaries
}

/// Percentage change from `previous` to `current`.
///
/// The change is relative to the magnitude of the previous value, so moving
/// from `-100` to `-50` is a 50% increase. A previous value of zero yields
/// `0`.
///
/// ```
/// # use finance_dashboard_api::ledger::domain::reports::percentage_change;
/// assert_eq!(50.0, percentage_change(150, 100));
/// assert_eq!(-50.0, percentage_change(50, 100));
/// assert_eq!(0.0, percentage_change(100, 0));
/// ```
pub fn percentage_change(current: i64, previous: i64) -> f64 {
    if previous == 0 {
        return 0.0;
    }

    ((current as f64 - previous as f64) / (previous as f64).abs()) * 100.0
}

/// `part` as a percentage of `whole`, or `0` if `whole` is zero.
fn share_of(part: i64, whole: i64) -> f64 {
    if whole == 0 {
        return 0.0;
    }

    part as f64 / whole as f64 * 100.0
}

/// The period a balance change is measured over.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Period {
    Day,
    Week,
    Month,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

/// How a balance moved over a period.
#[derive(Clone, Debug, PartialEq)]
pub struct BalanceChange {
    /// Difference between the current and previous balance, in minor units.
    pub amount: i64,
    pub percentage: f64,
    pub period: Period,
}

impl BalanceChange {
    pub fn between(current: i64, previous: i64, period: Period) -> Self {
        Self {
            amount: current.saturating_sub(previous),
            percentage: percentage_change(current, previous),
            period,
        }
    }
}

/// The window a spending chart covers, which determines bucket size.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Timeframe {
    Week,
    #[default]
    Month,
    Year,
}

#[derive(Debug, Eq, Error, PartialEq)]
#[error("unknown timeframe: {0:?}")]
pub struct TimeframeParseError(pub String);

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// Key identifying the bucket a date falls in.
    pub fn bucket_key(&self, date: NaiveDate) -> BucketKey {
        match self {
            Self::Week | Self::Month => BucketKey::Day(date),
            Self::Year => BucketKey::Month {
                year: date.year(),
                month: date.month(),
            },
        }
    }
}

impl FromStr for Timeframe {
    type Err = TimeframeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            other => Err(TimeframeParseError(other.to_owned())),
        }
    }
}

/// Identifies one point of a spending time series.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BucketKey {
    Day(NaiveDate),
    Month { year: i32, month: u32 },
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::Month { year, month } => write!(f, "{:04}-{:02}", year, month),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TimeBucket {
    pub key: BucketKey,
    /// Sum of absolute amounts in the bucket, in minor units.
    pub total: i64,
}

/// Spending totals in ascending chronological order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TimeBucketSeries {
    buckets: Vec<TimeBucket>,
}

impl TimeBucketSeries {
    pub fn buckets(&self) -> &[TimeBucket] {
        &self.buckets
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Bucket transactions by date and total their absolute amounts.
///
/// Dates are bucketed by UTC calendar day for the week and month timeframes,
/// and by calendar month for the year timeframe. Callers are expected to pass
/// only the transactions they want charted, typically expenses.
pub fn spending_over_time<'a, I>(transactions: I, timeframe: Timeframe) -> TimeBucketSeries
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut sorted: Vec<&Transaction> = transactions.into_iter().collect();
    sorted.sort_by_key(|transaction| transaction.date);

    let mut buckets: Vec<TimeBucket> = vec![];
    let mut positions: HashMap<BucketKey, usize> = HashMap::new();

    for transaction in sorted {
        let key = timeframe.bucket_key(transaction.date.date_naive());
        let position = *positions.entry(key).or_insert_with(|| {
            buckets.push(TimeBucket { key, total: 0 });

            buckets.len() - 1
        });

        let bucket = &mut buckets[position];
        bucket.total = bucket.total.saturating_add(transaction.amount.abs());
    }

    TimeBucketSeries { buckets }
}

#[derive(Debug, Eq, Error, PartialEq)]
pub enum SummaryError {
    /// Records in more than one currency were provided. Summaries never
    /// convert between currencies.
    #[error("cannot summarize {found} amounts alongside {expected} amounts")]
    MixedCurrencies { expected: String, found: String },
}

/// Determine the single currency shared by the provided records.
///
/// The first account's currency wins, then the first transaction's. With no
/// records at all, the default currency is used.
pub fn summary_currency(
    accounts: &[Account],
    transactions: &[Transaction],
) -> Result<Currency, SummaryError> {
    let currency = accounts
        .first()
        .map(|account| account.balance().currency())
        .or_else(|| transactions.first().map(|t| t.amount.currency()))
        .cloned()
        .unwrap_or_default();

    let mismatch = accounts
        .iter()
        .map(|account| account.balance().currency())
        .chain(transactions.iter().map(|t| t.amount.currency()))
        .find(|other| **other != currency);

    match mismatch {
        Some(other) => Err(SummaryError::MixedCurrencies {
            expected: currency.code().to_owned(),
            found: other.code().to_owned(),
        }),
        None => Ok(currency),
    }
}

/// A category's spending along with its share of all spending.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryShare {
    pub category: String,
    pub total: i64,
    pub count: usize,
    pub percentage: f64,
}

/// Income and spending totals for a list of transactions.
#[derive(Clone, Debug, PartialEq)]
pub struct CashFlow {
    /// Sum of income amounts, in minor units.
    pub total_income: i64,
    /// Sum of the absolute expense amounts, in minor units.
    pub total_spending: i64,
    /// Share of income that was not spent, or `0` without income.
    pub savings_rate: f64,
    pub categories: Vec<CategoryShare>,
}

impl CashFlow {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let total_income: i64 = transactions
            .iter()
            .filter(|t| t.is_income())
            .map(|t| t.amount.value())
            .fold(0, i64::saturating_add);
        let total_spending: i64 = transactions
            .iter()
            .filter(|t| t.is_expense())
            .map(|t| t.amount.abs())
            .fold(0, i64::saturating_add);

        let savings_rate = if total_income > 0 {
            share_of(total_income.saturating_sub(total_spending), total_income)
        } else {
            0.0
        };

        let categories = summarize_by_category(transactions.iter().filter(|t| t.is_expense()))
            .into_iter()
            .map(|summary| CategoryShare {
                percentage: share_of(summary.total, total_spending),
                category: summary.category,
                total: summary.total,
                count: summary.count,
            })
            .collect();

        Self {
            total_income,
            total_spending,
            savings_rate,
            categories,
        }
    }
}

/// Everything shown on the main dashboard page.
#[derive(Clone, Debug, PartialEq)]
pub struct DashboardSummary {
    pub currency: Currency,
    /// Sum of all account balances, in minor units.
    pub total_balance: i64,
    pub balance_change: Option<BalanceChange>,
    pub cash_flow: CashFlow,
    pub pending_count: usize,
    /// The most recent transactions, newest first.
    pub recent_transactions: Vec<Transaction>,
}

impl DashboardSummary {
    /// Build a summary from the raw records.
    ///
    /// # Arguments
    ///
    /// * `accounts` - All accounts to total.
    /// * `transactions` - The transactions to derive cash flow from.
    /// * `previous_balance` - The total balance at the start of the period,
    ///   if known. Without it the summary carries no balance change.
    pub fn assemble(
        accounts: &[Account],
        transactions: &[Transaction],
        previous_balance: Option<(i64, Period)>,
    ) -> Result<Self, SummaryError> {
        let currency = summary_currency(accounts, transactions)?;

        let total_balance = accounts
            .iter()
            .map(|account| account.balance().value())
            .fold(0, i64::saturating_add);

        let balance_change = previous_balance
            .map(|(previous, period)| BalanceChange::between(total_balance, previous, period));

        let pending_count = transactions
            .iter()
            .filter(|t| t.status == TransactionStatus::Pending)
            .count();

        let mut recent_transactions = transactions.to_vec();
        recent_transactions.sort_by(|a, b| b.date.cmp(&a.date));
        recent_transactions.truncate(RECENT_TRANSACTION_LIMIT);

        Ok(Self {
            currency,
            total_balance,
            balance_change,
            cash_flow: CashFlow::from_transactions(transactions),
            pending_count,
            recent_transactions,
        })
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SavingsAssessment {
    BelowTarget,
    OnTrack,
}

impl SavingsAssessment {
    pub fn for_rate(savings_rate: f64) -> Self {
        if savings_rate < SAVINGS_RATE_TARGET {
            Self::BelowTarget
        } else {
            Self::OnTrack
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Insights {
    /// The category with the most spending, if there was any spending.
    pub top_category: Option<CategoryShare>,
    pub savings: SavingsAssessment,
}

/// Spending analysis over a timeframe.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalyticsReport {
    pub currency: Currency,
    pub timeframe: Timeframe,
    pub cash_flow: CashFlow,
    pub spending_over_time: TimeBucketSeries,
    pub insights: Insights,
}

impl AnalyticsReport {
    pub fn assemble(
        transactions: &[Transaction],
        timeframe: Timeframe,
    ) -> Result<Self, SummaryError> {
        let currency = summary_currency(&[], transactions)?;
        let cash_flow = CashFlow::from_transactions(transactions);
        let spending_over_time =
            spending_over_time(transactions.iter().filter(|t| t.is_expense()), timeframe);

        let insights = Insights {
            top_category: cash_flow.categories.first().cloned(),
            savings: SavingsAssessment::for_rate(cash_flow.savings_rate),
        };

        Ok(Self {
            currency,
            timeframe,
            cash_flow,
            spending_over_time,
            insights,
        })
    }
}
