//! Yahoo Finance adapter.
//!
//! Backed by the keyless v8 chart endpoint. A quote is the metadata of a
//! one-day chart request; history comes from the parallel timestamp and
//! indicator arrays of the same endpoint with the requested range.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;

use crate::http_client::{HttpClient, HttpRequest};
use crate::provider::{DataProvider, ProviderError};
use crate::{HistoricalRecord, ProviderId, Quote, Symbol, ValidationError};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

pub struct YahooFinanceProvider {
    http: Arc<dyn HttpClient>,
    base_url: String,
}

impl YahooFinanceProvider {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            base_url: String::from(DEFAULT_BASE_URL),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn chart_url(&self, symbol: &Symbol, range: &str) -> String {
        format!(
            "{}/{}?range={}&interval=1d",
            self.base_url,
            urlencoding::encode(symbol.as_str()),
            urlencoding::encode(range),
        )
    }

    async fn fetch_chart(
        &self,
        symbol: &Symbol,
        range: &str,
    ) -> Result<ChartResult, ProviderError> {
        let request = HttpRequest::get(self.chart_url(symbol, range)).with_timeout_ms(5_000);
        let response = self.http.execute(request).await.map_err(|e| {
            ProviderError::network(format!("yahoo transport error: {}", e.message()))
        })?;

        if response.status == 429 {
            return Err(ProviderError::rate_limited(
                "yahoo returned status 429, too many requests",
            ));
        }

        // Yahoo reports unknown symbols as 404 with a structured error
        // body; decode the body before giving up on the status line.
        let envelope: ChartEnvelope = serde_json::from_str(&response.body).map_err(|e| {
            if response.is_success() {
                ProviderError::malformed_payload(format!("yahoo payload is not JSON: {e}"))
            } else {
                ProviderError::network(format!("yahoo returned status {}", response.status))
            }
        })?;

        if let Some(error) = envelope.chart.error {
            let message = format!(
                "yahoo rejected {symbol}: {} ({})",
                error.description, error.code
            );
            return Err(if error.code == "Not Found" {
                ProviderError::invalid_symbol(message)
            } else {
                ProviderError::network(message)
            });
        }

        if !response.is_success() {
            return Err(ProviderError::network(format!(
                "yahoo returned status {}",
                response.status
            )));
        }

        envelope
            .chart
            .result
            .and_then(|mut results| {
                if results.is_empty() {
                    None
                } else {
                    Some(results.swap_remove(0))
                }
            })
            .ok_or_else(|| {
                ProviderError::invalid_symbol(format!(
                    "could not retrieve data for {symbol}: not found or invalid symbol"
                ))
            })
    }
}

impl DataProvider for YahooFinanceProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn quote<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<Quote, ProviderError>> + Send + 'a>> {
        Box::pin(async move {
            let chart = self.fetch_chart(symbol, "1d").await?;
            let meta = chart.meta;

            let price = meta.regular_market_price.ok_or_else(|| {
                ProviderError::invalid_symbol(format!(
                    "could not retrieve quote for {symbol}: no market price reported"
                ))
            })?;

            let reported_symbol = match meta.symbol.as_deref() {
                Some(reported) => Symbol::parse(reported).map_err(validation_to_error)?,
                None => symbol.clone(),
            };
            let currency = meta.currency.as_deref().unwrap_or("USD");

            Quote::new(reported_symbol, price, currency)
                .and_then(|quote| {
                    quote.with_session_range(
                        None,
                        meta.regular_market_day_high,
                        meta.regular_market_day_low,
                    )
                })
                .and_then(|quote| quote.with_previous_close(meta.chart_previous_close))
                .map(|quote| quote.with_volume(meta.regular_market_volume))
                .map_err(validation_to_error)
        })
    }

    fn historical<'a>(
        &'a self,
        symbol: &'a Symbol,
        period: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<HistoricalRecord>, ProviderError>> + Send + 'a>>
    {
        Box::pin(async move {
            let chart = self.fetch_chart(symbol, period).await?;

            let timestamps = chart.timestamp.unwrap_or_default();
            let bars = chart
                .indicators
                .quote
                .into_iter()
                .next()
                .unwrap_or_default();

            // The chart arrays run oldest first and pad holidays with
            // nulls. Skip incomplete rows, then flip to newest first.
            let mut records = Vec::with_capacity(timestamps.len());
            for (index, ts) in timestamps.iter().enumerate() {
                let Some(row) = complete_row(&bars, index) else {
                    continue;
                };
                records.push(normalize_record(*ts, row)?);
            }
            records.reverse();

            if records.is_empty() {
                return Err(ProviderError::empty_data(format!(
                    "yahoo returned no historical data for {symbol}, period {period}"
                )));
            }

            Ok(records)
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    #[serde(default)]
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default, rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
    #[serde(default, rename = "regularMarketDayHigh")]
    regular_market_day_high: Option<f64>,
    #[serde(default, rename = "regularMarketDayLow")]
    regular_market_day_low: Option<f64>,
    #[serde(default, rename = "regularMarketVolume")]
    regular_market_volume: Option<u64>,
    #[serde(default, rename = "chartPreviousClose")]
    chart_previous_close: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<QuoteIndicator>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteIndicator {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

struct BarRow {
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
}

fn complete_row(bars: &QuoteIndicator, index: usize) -> Option<BarRow> {
    Some(BarRow {
        open: (*bars.open.get(index)?)?,
        high: (*bars.high.get(index)?)?,
        low: (*bars.low.get(index)?)?,
        close: (*bars.close.get(index)?)?,
        volume: (*bars.volume.get(index)?)?,
    })
}

fn normalize_record(ts: i64, row: BarRow) -> Result<HistoricalRecord, ProviderError> {
    let date = time::OffsetDateTime::from_unix_timestamp(ts)
        .map_err(|_| {
            ProviderError::malformed_payload(format!("yahoo timestamp {ts} is out of range"))
        })?
        .date();

    HistoricalRecord::new(
        format!(
            "{:04}-{:02}-{:02}",
            date.year(),
            u8::from(date.month()),
            date.day()
        ),
        row.open,
        row.high,
        row.low,
        row.close,
        row.volume,
    )
    .map_err(validation_to_error)
}

fn validation_to_error(error: ValidationError) -> ProviderError {
    ProviderError::malformed_payload(error.to_string())
}
