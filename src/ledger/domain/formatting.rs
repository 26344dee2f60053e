//! Display formatting for amounts and dates.
//!
//! These helpers produce the strings shown on dashboard cards and lists. They
//! never feed back into calculations.

use chrono::{DateTime, Utc};

use super::currency::{Currency, CurrencyAmount};

/// Default pattern for dates, eg `Mar 04, 2025`.
pub const DEFAULT_DATE_FORMAT: &str = "%b %d, %Y";

/// Pattern for dates where the year is implied, eg `Mar 04`.
pub const SHORT_DATE_FORMAT: &str = "%b %d";

const CURRENCY_SYMBOLS: &[(&str, &str)] = &[
    ("AUD", "A$"),
    ("CAD", "CA$"),
    ("CNY", "CN¥"),
    ("EUR", "€"),
    ("GBP", "£"),
    ("INR", "₹"),
    ("JPY", "¥"),
    ("USD", "$"),
];

/// Get the display symbol for a currency, if it has one.
pub fn currency_symbol(currency: &Currency) -> Option<&'static str> {
    CURRENCY_SYMBOLS
        .iter()
        .find(|(code, _)| *code == currency.code())
        .map(|(_, symbol)| *symbol)
}

/// Format an amount for display, with a currency symbol and thousands
/// separators.
///
/// Currencies without a known symbol are prefixed with their code instead.
///
/// ```
/// # use finance_dashboard_api::ledger::domain::{currency::*, formatting::format_currency};
/// let usd = Currency::from_code("USD");
/// assert_eq!("$2,547.83", format_currency(&CurrencyAmount::from_minor(usd.clone(), 254783)));
/// assert_eq!("-$450.19", format_currency(&CurrencyAmount::from_minor(usd, -45019)));
/// ```
pub fn format_currency(amount: &CurrencyAmount) -> String {
    let currency = amount.currency();
    let sign = if amount.value().is_negative() { "-" } else { "" };
    let (whole_part, decimal_part) = currency.split_value(amount.value());

    let mut number = group_thousands(&whole_part);
    if !decimal_part.is_empty() {
        number.push('.');
        number.push_str(&decimal_part);
    }

    match currency_symbol(currency) {
        Some(symbol) => format!("{}{}{}", sign, symbol, number),
        None => format!("{}{} {}", sign, currency.code(), number),
    }
}

/// Format a timestamp with a `strftime`-style pattern.
pub fn format_date(date: &DateTime<Utc>, pattern: &str) -> String {
    date.format(pattern).to_string()
}

/// Format a percentage with a single decimal place, eg `75.0%`.
pub fn format_percentage(value: f64) -> String {
    format!("{:.1}%", value)
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    grouped
}
