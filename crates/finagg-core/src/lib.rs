//! Cached, fallback-aggregating access to stock market data.
//!
//! The crate is organized around three layers:
//!
//! - [`provider`]: the [`DataProvider`](provider::DataProvider) contract
//!   and the adapters in [`providers`] that speak to real upstreams over
//!   an [`HttpClient`](http_client::HttpClient).
//! - [`cache`]: a cache-aside wrapper with deterministic keys and
//!   compile-time value shapes, over a pluggable TTL byte store.
//! - [`service`]: the [`MarketDataService`] facade that walks providers
//!   in priority order, caches results, and aggregates failures.
//!
//! ```no_run
//! use std::sync::Arc;
//! use finagg_core::{MarketDataService, ReqwestHttpClient, Symbol};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = MarketDataService::builder()
//!     .with_env_providers(Arc::new(ReqwestHttpClient::new()))
//!     .build()?;
//!
//! let quote = service.quote(&Symbol::parse("IBM")?).await?;
//! println!("{} trades at {} {}", quote.symbol, quote.price, quote.currency);
//! # Ok(())
//! # }
//! ```

pub mod cache;
mod domain;
mod error;
pub mod http_client;
pub mod provider;
pub mod providers;
pub mod service;
mod source;

pub use cache::{CacheKey, CacheManager, CacheShape, CacheValue, CachedOp, MemoryCacheStore};
pub use domain::{HistoricalRecord, Quote, StockPerformance, Symbol};
pub use error::ValidationError;
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use provider::{DataProvider, ProviderError, ProviderErrorKind};
pub use providers::{AlphaVantageProvider, YahooFinanceProvider};
pub use service::{MarketDataService, MarketDataServiceBuilder, ServiceError};
pub use source::ProviderId;
