//! Market data facade: cached reads over an ordered provider chain.
//!
//! Each read first consults the cache, then walks the configured
//! providers in priority order until one answers. Individual provider
//! failures never cross the public boundary on their own; callers see
//! either a value or an aggregate error carrying every attempt.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::cache::{CacheManager, CacheStore, CachedOp, MemoryCacheStore};
use crate::http_client::HttpClient;
use crate::provider::DataProvider;
use crate::providers::{AlphaVantageProvider, YahooFinanceProvider};
use crate::{HistoricalRecord, Quote, StockPerformance, Symbol};

const QUOTE_TTL: Duration = Duration::from_secs(300);
const HISTORICAL_TTL: Duration = Duration::from_secs(3600);

const QUOTE_OP: CachedOp<Quote> =
    CachedOp::new("market_data:quote", "get_quote", Some(QUOTE_TTL));
const HISTORICAL_OP: CachedOp<Vec<HistoricalRecord>> = CachedOp::new(
    "market_data:historical",
    "get_historical_data",
    Some(HISTORICAL_TTL),
);

/// Environment variables consulted for the Alpha Vantage API key, in order.
const API_KEY_VARS: [&str; 2] = ["FINAGG_ALPHAVANTAGE_API_KEY", "ALPHAVANTAGE_API_KEY"];

/// Failure of a service operation, after all providers were consulted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("no providers configured")]
    NoProvidersConfigured,

    #[error("failed to fetch quote for {symbol} after trying all providers: {}", .attempts.join("; "))]
    QuoteExhausted {
        symbol: Symbol,
        attempts: Vec<String>,
    },

    #[error("failed to fetch historical data for {symbol}, period {period} after trying all providers: {}", .attempts.join("; "))]
    HistoricalExhausted {
        symbol: Symbol,
        period: String,
        attempts: Vec<String>,
    },

    #[error("comparison failed for all requested symbols: {}", .attempts.join("; "))]
    ComparisonExhausted { attempts: Vec<String> },
}

struct ServiceInner {
    providers: Vec<Arc<dyn DataProvider>>,
    cache: CacheManager,
}

/// Cached, fallback-aggregating access to market data.
///
/// Cheap to clone; all clones share the provider chain and cache.
#[derive(Clone)]
pub struct MarketDataService {
    inner: Arc<ServiceInner>,
}

impl std::fmt::Debug for MarketDataService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketDataService").finish_non_exhaustive()
    }
}

impl MarketDataService {
    pub fn builder() -> MarketDataServiceBuilder {
        MarketDataServiceBuilder::new()
    }

    /// Current quote for one symbol, served from cache when fresh.
    pub async fn quote(&self, symbol: &Symbol) -> Result<Quote, ServiceError> {
        let key = QUOTE_OP.key().arg("symbol", symbol);
        self.inner
            .cache
            .get_or_fetch(&QUOTE_OP, &key, self.quote_from_providers(symbol))
            .await
    }

    /// Daily history for one symbol over a period, newest record first.
    pub async fn historical(
        &self,
        symbol: &Symbol,
        period: &str,
    ) -> Result<Vec<HistoricalRecord>, ServiceError> {
        let key = HISTORICAL_OP
            .key()
            .arg("symbol", symbol)
            .arg("period", period);
        self.inner
            .cache
            .get_or_fetch(
                &HISTORICAL_OP,
                &key,
                self.historical_from_providers(symbol, period),
            )
            .await
    }

    /// Performance of several symbols over one period, fetched concurrently.
    ///
    /// Symbols whose data cannot be fetched, or whose window holds fewer
    /// than two records, are dropped from the result. The output keeps
    /// the input order of the surviving symbols. Only when every symbol
    /// drops out does the call fail.
    pub async fn compare_symbols(
        &self,
        symbols: &[Symbol],
        period: &str,
    ) -> Result<Vec<StockPerformance>, ServiceError> {
        let mut handles = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let service = self.clone();
            let symbol = symbol.clone();
            let period = period.to_owned();
            handles.push(tokio::spawn(async move {
                let outcome = service.window_performance(&symbol, &period).await;
                (symbol, outcome)
            }));
        }

        let mut performances = Vec::with_capacity(handles.len());
        let mut attempts = Vec::new();
        for handle in handles {
            match handle.await {
                Ok((_, Ok(performance))) => performances.push(performance),
                Ok((symbol, Err(message))) => {
                    warn!(%symbol, %message, "symbol dropped from comparison");
                    attempts.push(message);
                }
                Err(join_error) => {
                    warn!(%join_error, "comparison task failed to complete");
                    attempts.push(format!("comparison task failed: {join_error}"));
                }
            }
        }

        if performances.is_empty() {
            return Err(ServiceError::ComparisonExhausted { attempts });
        }

        Ok(performances)
    }

    async fn window_performance(
        &self,
        symbol: &Symbol,
        period: &str,
    ) -> Result<StockPerformance, String> {
        let records = self
            .historical(symbol, period)
            .await
            .map_err(|error| error.to_string())?;

        if records.len() < 2 {
            return Err(format!(
                "insufficient historical data for {symbol}, period {period}"
            ));
        }

        // Records run newest first: the window opens on the last record
        // and closes on the first.
        let start_price = records[records.len() - 1].close;
        let end_price = records[0].close;
        Ok(StockPerformance::from_window(
            symbol.clone(),
            start_price,
            end_price,
        ))
    }

    async fn quote_from_providers(&self, symbol: &Symbol) -> Result<Quote, ServiceError> {
        let mut attempts = Vec::with_capacity(self.inner.providers.len());

        for provider in &self.inner.providers {
            match provider.quote(symbol).await {
                Ok(quote) => {
                    info!(provider = %provider.id(), %symbol, "quote fetched");
                    return Ok(quote);
                }
                Err(error) => {
                    warn!(provider = %provider.id(), %symbol, %error, "quote fetch failed");
                    attempts.push(format!(
                        "provider {} failed for {}: {}",
                        provider.id(),
                        symbol,
                        error.message()
                    ));
                }
            }
        }

        Err(ServiceError::QuoteExhausted {
            symbol: symbol.clone(),
            attempts,
        })
    }

    async fn historical_from_providers(
        &self,
        symbol: &Symbol,
        period: &str,
    ) -> Result<Vec<HistoricalRecord>, ServiceError> {
        let mut attempts = Vec::with_capacity(self.inner.providers.len());

        for provider in &self.inner.providers {
            match provider.historical(symbol, period).await {
                Ok(records) if records.is_empty() => {
                    // An empty window is no better than a failed call.
                    warn!(provider = %provider.id(), %symbol, period, "empty historical result");
                    attempts.push(format!(
                        "provider {} returned empty historical data for {}, period {}",
                        provider.id(),
                        symbol,
                        period
                    ));
                }
                Ok(records) => {
                    info!(
                        provider = %provider.id(),
                        %symbol,
                        period,
                        records = records.len(),
                        "historical data fetched"
                    );
                    return Ok(records);
                }
                Err(error) => {
                    warn!(provider = %provider.id(), %symbol, period, %error, "historical fetch failed");
                    attempts.push(format!(
                        "provider {} failed for {}: {}",
                        provider.id(),
                        symbol,
                        error.message()
                    ));
                }
            }
        }

        Err(ServiceError::HistoricalExhausted {
            symbol: symbol.clone(),
            period: period.to_owned(),
            attempts,
        })
    }
}

/// Assembles a [`MarketDataService`] from providers and a cache store.
#[derive(Default)]
pub struct MarketDataServiceBuilder {
    providers: Vec<Arc<dyn DataProvider>>,
    store: Option<Arc<dyn CacheStore>>,
}

impl MarketDataServiceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provider; earlier registrations get higher priority.
    pub fn with_provider(mut self, provider: Arc<dyn DataProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn with_store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Register the built-in providers over `http`, reading the Alpha
    /// Vantage key from the environment. Without a key only Yahoo is
    /// registered; with one, Alpha Vantage leads the chain.
    pub fn with_env_providers(mut self, http: Arc<dyn HttpClient>) -> Self {
        let api_key = API_KEY_VARS
            .iter()
            .find_map(|name| std::env::var(name).ok())
            .filter(|value| !value.trim().is_empty());

        if let Some(api_key) = api_key {
            self = self.with_provider(Arc::new(AlphaVantageProvider::new(http.clone(), api_key)));
        } else {
            info!("no alphavantage api key in environment, provider not registered");
        }

        self.with_provider(Arc::new(YahooFinanceProvider::new(http)))
    }

    pub fn build(self) -> Result<MarketDataService, ServiceError> {
        if self.providers.is_empty() {
            return Err(ServiceError::NoProvidersConfigured);
        }

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryCacheStore::new()));

        Ok(MarketDataService {
            inner: Arc::new(ServiceInner {
                providers: self.providers,
                cache: CacheManager::new(store),
            }),
        })
    }
}
