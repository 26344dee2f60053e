use thiserror::Error;

/// Currencies with a non-standard number of minor units. Anything not listed
/// here uses two decimal places.
const MINOR_UNIT_OVERRIDES: &[(&str, u8)] = &[
    ("BHD", 3),
    ("CLP", 0),
    ("ISK", 0),
    ("JPY", 0),
    ("KRW", 0),
    ("KWD", 3),
    ("OMR", 3),
    ("VND", 0),
];

const DEFAULT_MINOR_UNITS: u8 = 2;

#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct Currency {
    code: String,
    minor_units: u8,
}

#[derive(Debug, Eq, Error, PartialEq)]
pub enum CurrencyParseError {
    /// The provided amount could not be parsed as a number.
    #[error("invalid amount: {0:?}")]
    InvalidNumber(String),
    /// The provided amount included more precision than the currency's minor
    /// units allow for. The second field is the number of decimal places
    /// that were provided.
    #[error("{0:?} does not allow {1} decimal places")]
    TooManyDecimals(Currency, usize),
}

impl Currency {
    /// Construct a new currency.
    ///
    /// # Arguments
    /// * `code` - The currency's unique string code.
    /// * `minor_units` - The number of decimal places allowed by the currency.
    ///
    /// # Examples
    ///
    /// ```
    /// # use finance_dashboard_api::ledger::domain::currency::Currency;
    /// let _usd = Currency::new("USD".to_owned(), 2);
    /// let _jpy = Currency::new("JPY".to_owned(), 0);
    /// ```
    pub fn new(code: String, minor_units: u8) -> Self {
        Self { code, minor_units }
    }

    /// Look up a currency by its ISO-4217 code.
    ///
    /// The code is normalized to upper case. Unknown codes are accepted and
    /// assumed to have two minor units.
    ///
    /// ```
    /// # use finance_dashboard_api::ledger::domain::currency::Currency;
    /// assert_eq!(0, Currency::from_code("jpy").minor_units());
    /// assert_eq!(2, Currency::from_code("USD").minor_units());
    /// ```
    pub fn from_code(code: &str) -> Self {
        let code = code.trim().to_uppercase();
        let minor_units = MINOR_UNIT_OVERRIDES
            .iter()
            .find(|(known, _)| *known == code)
            .map(|(_, units)| *units)
            .unwrap_or(DEFAULT_MINOR_UNITS);

        Self { code, minor_units }
    }

    /// Parse an amount from a string representation.
    ///
    /// # Arguments
    /// * `raw_amount` - A string containing a numeric amount. This can include
    ///   whitespace and separators.
    ///
    /// # Returns
    ///
    /// The parsed amount as an integer in the currency's minor units. This can
    /// be represented as `amount * 10^n` where `n` is the currency's minor
    /// units.
    pub fn parse_amount(&self, raw_amount: &str) -> Result<i64, CurrencyParseError> {
        let decimal = ".";
        let separator = ",";

        let cleaned_amount = raw_amount.replace(separator, "").replace(' ', "");

        let number_to_parse = match cleaned_amount.rsplit_once(decimal) {
            None => format!("{}{}", cleaned_amount, "0".repeat(self.minor_units.into())),

            Some((whole_part, decimal_part)) => {
                // Trailing zeroes carry no precision, so "85.50" is a valid
                // amount for a currency with one minor unit.
                let decimal_part = decimal_part.trim_end_matches('0');
                let whole_part = match whole_part {
                    "" | "-" => format!("{}0", whole_part),
                    digits => digits.to_owned(),
                };

                if decimal_part.len() <= usize::from(self.minor_units) {
                    format!(
                        "{}{:0<width$}",
                        whole_part,
                        decimal_part,
                        width = self.minor_units.into(),
                    )
                } else {
                    return Err(CurrencyParseError::TooManyDecimals(
                        self.clone(),
                        decimal_part.len(),
                    ));
                }
            }
        };

        number_to_parse
            .parse()
            .map_err(|_| CurrencyParseError::InvalidNumber(raw_amount.to_owned()))
    }

    /// Format a minor-unit value as a plain decimal string, eg `-450.19`.
    pub fn format_value(&self, value: i64) -> String {
        let sign = if value.is_negative() { "-" } else { "" };
        let (whole_part, decimal_part) = self.split_value(value);

        if decimal_part.is_empty() {
            format!("{}{}", sign, whole_part)
        } else {
            format!("{}{}.{}", sign, whole_part, decimal_part)
        }
    }

    /// Split the absolute value of an amount into its whole and decimal
    /// digits.
    pub(crate) fn split_value(&self, value: i64) -> (String, String) {
        let amount_str = value.unsigned_abs().to_string();

        // Pad so there is always at least one whole digit in front of the
        // decimal point.
        let padded = format!(
            "{:0>width$}",
            amount_str,
            width = usize::from(self.minor_units) + 1
        );
        let decimal_location = padded.len() - usize::from(self.minor_units);

        (
            padded[..decimal_location].to_owned(),
            padded[decimal_location..].to_owned(),
        )
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn minor_units(&self) -> u8 {
        self.minor_units
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::from_code("USD")
    }
}

/// An amount associated with a specific currency.
///
/// The amount is always stored as a whole number, so the value depends on the
/// associated currency's minor units.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CurrencyAmount {
    currency: Currency,
    value: i64,
}

impl CurrencyAmount {
    pub fn from_minor(currency: Currency, value: i64) -> Self {
        Self { currency, value }
    }

    pub fn from_str(currency: Currency, raw_amount: &str) -> Result<Self, CurrencyParseError> {
        let value = currency.parse_amount(raw_amount)?;

        Ok(Self { currency, value })
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    /// The magnitude of the amount. `i64::MIN` saturates to `i64::MAX`.
    pub fn abs(&self) -> i64 {
        self.value.saturating_abs()
    }

    pub fn format_value(&self) -> String {
        self.currency.format_value(self.value)
    }
}
