//! Alpha Vantage adapter.
//!
//! Uses the `GLOBAL_QUOTE` and `TIME_SERIES_DAILY` endpoints. Alpha
//! Vantage reports numeric fields as JSON strings and signals rate
//! limiting through a `Note`/`Information` key in an otherwise-200
//! response, so classification happens on the decoded body, not the
//! status line.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;

use crate::http_client::{HttpClient, HttpRequest};
use crate::provider::{DataProvider, ProviderError};
use crate::{HistoricalRecord, ProviderId, Quote, Symbol, ValidationError};

const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";

pub struct AlphaVantageProvider {
    http: Arc<dyn HttpClient>,
    api_key: String,
    base_url: String,
}

impl AlphaVantageProvider {
    pub fn new(http: Arc<dyn HttpClient>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            base_url: String::from(DEFAULT_BASE_URL),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self, params: &[(&str, &str)]) -> String {
        let mut url = format!("{}?", self.base_url);
        for (name, value) in params {
            url.push_str(name);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
            url.push('&');
        }
        url.push_str("apikey=");
        url.push_str(&urlencoding::encode(&self.api_key));
        url
    }

    async fn request(&self, url: String) -> Result<serde_json::Value, ProviderError> {
        let request = HttpRequest::get(url).with_timeout_ms(5_000);
        let response = self.http.execute(request).await.map_err(|e| {
            ProviderError::network(format!("alphavantage transport error: {}", e.message()))
        })?;

        if !response.is_success() {
            return Err(ProviderError::network(format!(
                "alphavantage returned status {}",
                response.status
            )));
        }

        let body: serde_json::Value = serde_json::from_str(&response.body).map_err(|e| {
            ProviderError::malformed_payload(format!("alphavantage payload is not JSON: {e}"))
        })?;

        if let Some(message) = body.get("Error Message").and_then(|v| v.as_str()) {
            return Err(ProviderError::invalid_symbol(message));
        }

        // The free tier reports its quota through "Note" or "Information".
        if let Some(note) = body
            .get("Note")
            .or_else(|| body.get("Information"))
            .and_then(|v| v.as_str())
        {
            return Err(ProviderError::rate_limited(note));
        }

        Ok(body)
    }
}

impl DataProvider for AlphaVantageProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Alphavantage
    }

    fn quote<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<Quote, ProviderError>> + Send + 'a>> {
        Box::pin(async move {
            let url = self.endpoint(&[
                ("function", "GLOBAL_QUOTE"),
                ("symbol", symbol.as_str()),
            ]);
            let body = self.request(url).await?;

            let payload = body
                .get("Global Quote")
                .filter(|quote| quote.as_object().is_some_and(|map| !map.is_empty()))
                .ok_or_else(|| {
                    ProviderError::malformed_payload(format!(
                        "no global quote data found for {symbol}"
                    ))
                })?;

            let raw: GlobalQuotePayload = serde_json::from_value(payload.clone())
                .map_err(|e| {
                    ProviderError::malformed_payload(format!(
                        "unexpected global quote shape for {symbol}: {e}"
                    ))
                })?;

            normalize_quote(symbol, raw)
        })
    }

    fn historical<'a>(
        &'a self,
        symbol: &'a Symbol,
        period: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<HistoricalRecord>, ProviderError>> + Send + 'a>>
    {
        Box::pin(async move {
            // Alpha Vantage knows no named periods, only an output size:
            // "compact" covers the trailing 100 trading days. Anything but
            // a literal "full" maps to compact.
            let outputsize = if period == "full" { "full" } else { "compact" };
            let url = self.endpoint(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", symbol.as_str()),
                ("outputsize", outputsize),
            ]);
            let body = self.request(url).await?;

            let series = body.get("Time Series (Daily)").ok_or_else(|| {
                ProviderError::malformed_payload(format!(
                    "no daily time series data found for {symbol}"
                ))
            })?;

            // BTreeMap sorts the YYYY-MM-DD keys ascending; the contract
            // wants newest first, so iterate in reverse.
            let days: BTreeMap<String, DailyBarPayload> =
                serde_json::from_value(series.clone()).map_err(|e| {
                    ProviderError::malformed_payload(format!(
                        "unexpected time series shape for {symbol}: {e}"
                    ))
                })?;

            let mut records = Vec::with_capacity(days.len());
            for (date, bar) in days.into_iter().rev() {
                records.push(normalize_record(&date, bar)?);
            }

            Ok(records)
        })
    }
}

#[derive(Debug, Deserialize)]
struct GlobalQuotePayload {
    #[serde(rename = "01. symbol")]
    symbol: Option<String>,
    #[serde(rename = "02. open")]
    open: Option<String>,
    #[serde(rename = "03. high")]
    high: Option<String>,
    #[serde(rename = "04. low")]
    low: Option<String>,
    #[serde(rename = "05. price")]
    price: Option<String>,
    #[serde(rename = "06. volume")]
    volume: Option<String>,
    #[serde(rename = "07. latest trading day")]
    latest_trading_day: Option<String>,
    #[serde(rename = "08. previous close")]
    previous_close: Option<String>,
    #[serde(rename = "09. change")]
    change: Option<String>,
    #[serde(rename = "10. change percent")]
    change_percent: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DailyBarPayload {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. volume")]
    volume: String,
}

fn normalize_quote(symbol: &Symbol, raw: GlobalQuotePayload) -> Result<Quote, ProviderError> {
    let price = parse_field("05. price", raw.price.as_deref())?;
    let reported_symbol = match raw.symbol.as_deref() {
        Some(reported) => Symbol::parse(reported).map_err(validation_to_error)?,
        None => symbol.clone(),
    };

    // Alpha Vantage stock quotes are USD-denominated.
    Quote::new(reported_symbol, price, "USD")
        .and_then(|quote| {
            quote.with_session_range(
                parse_optional_field(raw.open.as_deref())?,
                parse_optional_field(raw.high.as_deref())?,
                parse_optional_field(raw.low.as_deref())?,
            )
        })
        .and_then(|quote| {
            quote.with_previous_close(parse_optional_field(raw.previous_close.as_deref())?)
        })
        .map(|quote| {
            quote.with_volume(
                raw.volume
                    .as_deref()
                    .and_then(|value| value.parse::<u64>().ok()),
            )
        })
        .and_then(|quote| {
            quote.with_daily_change(
                raw.latest_trading_day,
                raw.change
                    .as_deref()
                    .and_then(|value| value.parse::<f64>().ok()),
                raw.change_percent,
            )
        })
        .map_err(validation_to_error)
}

fn normalize_record(date: &str, bar: DailyBarPayload) -> Result<HistoricalRecord, ProviderError> {
    HistoricalRecord::new(
        date,
        parse_field("1. open", Some(&bar.open))?,
        parse_field("2. high", Some(&bar.high))?,
        parse_field("3. low", Some(&bar.low))?,
        parse_field("4. close", Some(&bar.close))?,
        bar.volume.parse::<u64>().map_err(|_| {
            ProviderError::malformed_payload(format!(
                "alphavantage volume '{}' is not an integer",
                bar.volume
            ))
        })?,
    )
    .map_err(validation_to_error)
}

fn parse_field(name: &str, value: Option<&str>) -> Result<f64, ProviderError> {
    let text = value.ok_or_else(|| {
        ProviderError::malformed_payload(format!("alphavantage field '{name}' is missing"))
    })?;
    text.parse::<f64>().map_err(|_| {
        ProviderError::malformed_payload(format!(
            "alphavantage field '{name}' is not numeric: '{text}'"
        ))
    })
}

fn parse_optional_field(value: Option<&str>) -> Result<Option<f64>, ValidationError> {
    Ok(value.and_then(|text| text.parse::<f64>().ok()))
}

fn validation_to_error(error: ValidationError) -> ProviderError {
    ProviderError::malformed_payload(error.to_string())
}
