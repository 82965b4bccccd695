use serde::{Deserialize, Serialize};

use crate::{Symbol, ValidationError};

/// Normalized quote snapshot. Created fresh per fetch, never mutated.
///
/// Required fields are common to every provider; the optional tail holds
/// whatever the selected provider happened to report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: Symbol,
    pub price: f64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_close: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_trading_day: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_percent: Option<String>,
}

impl Quote {
    pub fn new(
        symbol: Symbol,
        price: f64,
        currency: impl AsRef<str>,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("price", price)?;

        Ok(Self {
            symbol,
            price,
            currency: validate_currency_code(currency.as_ref())?,
            open: None,
            high: None,
            low: None,
            previous_close: None,
            volume: None,
            market_cap: None,
            latest_trading_day: None,
            change: None,
            change_percent: None,
        })
    }

    pub fn with_session_range(
        mut self,
        open: Option<f64>,
        high: Option<f64>,
        low: Option<f64>,
    ) -> Result<Self, ValidationError> {
        validate_optional_non_negative("open", open)?;
        validate_optional_non_negative("high", high)?;
        validate_optional_non_negative("low", low)?;
        self.open = open;
        self.high = high;
        self.low = low;
        Ok(self)
    }

    pub fn with_previous_close(mut self, previous_close: Option<f64>) -> Result<Self, ValidationError> {
        validate_optional_non_negative("previous_close", previous_close)?;
        self.previous_close = previous_close;
        Ok(self)
    }

    pub fn with_volume(mut self, volume: Option<u64>) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_market_cap(mut self, market_cap: Option<u64>) -> Self {
        self.market_cap = market_cap;
        self
    }

    /// Attach the daily-movement fields some providers report alongside the price.
    pub fn with_daily_change(
        mut self,
        latest_trading_day: Option<String>,
        change: Option<f64>,
        change_percent: Option<String>,
    ) -> Result<Self, ValidationError> {
        validate_optional_finite("change", change)?;
        self.latest_trading_day = latest_trading_day;
        self.change = change;
        self.change_percent = change_percent;
        Ok(self)
    }
}

/// One calendar day of OHLCV history.
///
/// Provider results hold these ordered most-recent date first; consumers
/// rely on that ordering without re-sorting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl HistoricalRecord {
    pub fn new(
        date: impl Into<String>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Result<Self, ValidationError> {
        let date = date.into();
        validate_record_date(&date)?;
        validate_non_negative("open", open)?;
        validate_non_negative("high", high)?;
        validate_non_negative("low", low)?;
        validate_non_negative("close", close)?;

        if high < low {
            return Err(ValidationError::InvalidRecordRange);
        }

        Ok(Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        })
    }
}

/// Derived performance of one symbol over a requested window. Not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockPerformance {
    pub symbol: Symbol,
    pub start_price: f64,
    pub end_price: f64,
    pub change: f64,
    pub change_percent: f64,
}

impl StockPerformance {
    /// Compute performance from the oldest and newest closes of a window.
    pub fn from_window(symbol: Symbol, start_price: f64, end_price: f64) -> Self {
        let change = end_price - start_price;
        let change_percent = if start_price == 0.0 {
            0.0
        } else {
            change / start_price * 100.0
        };

        Self {
            symbol,
            start_price,
            end_price,
            change,
            change_percent,
        }
    }
}

/// Validate and normalize currency to an uppercase 3-letter code.
pub fn validate_currency_code(input: &str) -> Result<String, ValidationError> {
    let normalized = input.trim().to_ascii_uppercase();
    let is_valid = normalized.len() == 3 && normalized.chars().all(|ch| ch.is_ascii_alphabetic());

    if !is_valid {
        return Err(ValidationError::InvalidCurrency {
            value: input.to_owned(),
        });
    }

    Ok(normalized)
}

/// Check the literal `YYYY-MM-DD` shape of a record date.
fn validate_record_date(value: &str) -> Result<(), ValidationError> {
    let bytes = value.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(index, byte)| matches!(index, 4 | 7) || byte.is_ascii_digit());

    if !well_formed {
        return Err(ValidationError::InvalidRecordDate {
            value: value.to_owned(),
        });
    }

    let month: u8 = value[5..7].parse().unwrap_or(0);
    let day: u8 = value[8..10].parse().unwrap_or(0);
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(ValidationError::InvalidRecordDate {
            value: value.to_owned(),
        });
    }

    Ok(())
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}

fn validate_optional_non_negative(
    field: &'static str,
    value: Option<f64>,
) -> Result<(), ValidationError> {
    if let Some(value) = value {
        validate_non_negative(field, value)?;
    }
    Ok(())
}

fn validate_optional_finite(
    field: &'static str,
    value: Option<f64>,
) -> Result<(), ValidationError> {
    if let Some(value) = value {
        if !value.is_finite() {
            return Err(ValidationError::NonFiniteValue { field });
        }
    }
    Ok(())
}
