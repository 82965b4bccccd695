//! Provider contract and error classification.
//!
//! Every upstream data source implements [`DataProvider`] and reports
//! failures as [`ProviderError`]. A provider error of any kind is
//! recoverable by fallback: the loop records it and moves on to the
//! next provider. Only the service-level aggregates in
//! [`crate::service`] cross the public boundary.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{HistoricalRecord, ProviderId, Quote, Symbol};

/// Classification of one provider call's failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    InvalidSymbol,
    RateLimited,
    Network,
    MalformedPayload,
    EmptyData,
    Internal,
}

/// Structured error reported by a single provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    kind: ProviderErrorKind,
    message: String,
}

impl ProviderError {
    fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_symbol(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::InvalidSymbol, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::RateLimited, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Network, message)
    }

    pub fn malformed_payload(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::MalformedPayload, message)
    }

    pub fn empty_data(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::EmptyData, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Internal, message)
    }

    pub const fn kind(&self) -> ProviderErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            ProviderErrorKind::InvalidSymbol => "provider.invalid_symbol",
            ProviderErrorKind::RateLimited => "provider.rate_limited",
            ProviderErrorKind::Network => "provider.network",
            ProviderErrorKind::MalformedPayload => "provider.malformed_payload",
            ProviderErrorKind::EmptyData => "provider.empty_data",
            ProviderErrorKind::Internal => "provider.internal",
        }
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for ProviderError {}

/// Upstream data source contract.
///
/// Implementations must be `Send + Sync`; they are shared across all
/// concurrent requests for the lifetime of the service.
pub trait DataProvider: Send + Sync {
    /// Returns the provider identifier used in priority lists and logs.
    fn id(&self) -> ProviderId;

    /// Fetches the current quote for one symbol.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on an invalid symbol, a rate-limit
    /// signal, a transport failure, or a malformed upstream payload.
    fn quote<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<Quote, ProviderError>> + Send + 'a>>;

    /// Fetches historical daily records for one symbol over a period.
    ///
    /// The returned sequence is ordered most-recent date first. A period
    /// value outside this provider's vocabulary is the provider's concern
    /// and surfaces as an ordinary [`ProviderError`].
    fn historical<'a>(
        &'a self,
        symbol: &'a Symbol,
        period: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<HistoricalRecord>, ProviderError>> + Send + 'a>>;
}
