//! Cache-aside wrapper for asynchronous read operations.
//!
//! An operation is registered for caching by declaring a [`CachedOp`]
//! with a key prefix, the operation name, and a TTL; the value type's
//! [`CacheValue`] impl carries the wire shape as a compile-time tag, so
//! decoding a stored entry never inspects the value to guess its form.
//!
//! Known limitation: there is no de-duplication of concurrent misses on
//! the same key. N callers racing on a cold key all invoke the wrapped
//! operation and all write the same entry. The last write wins and the
//! entries are identical, so the cache stays consistent, at the price of
//! redundant upstream calls.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::{CacheKey, CacheStore};
use crate::{HistoricalRecord, Quote};

/// Declared wire shape of a cacheable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheShape {
    /// Primitive rendered as plain text.
    Scalar,
    /// Single structured record, JSON-encoded.
    Record,
    /// Ordered list of structured records, JSON-encoded.
    RecordList,
    /// Free-form JSON document.
    Raw,
}

/// Encode/decode failure for a cached entry.
#[derive(Debug, Error)]
pub enum CacheCodecError {
    #[error("cached bytes are not valid UTF-8")]
    NotUtf8,
    #[error("cached scalar failed to parse: {0}")]
    ScalarParse(String),
    #[error("cached JSON failed to (de)serialize: {0}")]
    Json(#[from] serde_json::Error),
}

/// Value that can live in the cache, with its shape fixed at compile time.
pub trait CacheValue: Sized + Send {
    const SHAPE: CacheShape;

    fn encode(&self) -> Result<Vec<u8>, CacheCodecError>;
    fn decode(bytes: &[u8]) -> Result<Self, CacheCodecError>;
}

fn encode_json<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, CacheCodecError> {
    Ok(serde_json::to_vec(value)?)
}

fn decode_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, CacheCodecError> {
    Ok(serde_json::from_slice(bytes)?)
}

impl CacheValue for Quote {
    const SHAPE: CacheShape = CacheShape::Record;

    fn encode(&self) -> Result<Vec<u8>, CacheCodecError> {
        encode_json(self)
    }

    fn decode(bytes: &[u8]) -> Result<Self, CacheCodecError> {
        decode_json(bytes)
    }
}

impl CacheValue for Vec<HistoricalRecord> {
    const SHAPE: CacheShape = CacheShape::RecordList;

    fn encode(&self) -> Result<Vec<u8>, CacheCodecError> {
        encode_json(self)
    }

    fn decode(bytes: &[u8]) -> Result<Self, CacheCodecError> {
        decode_json(bytes)
    }
}

impl CacheValue for serde_json::Value {
    const SHAPE: CacheShape = CacheShape::Raw;

    fn encode(&self) -> Result<Vec<u8>, CacheCodecError> {
        encode_json(self)
    }

    fn decode(bytes: &[u8]) -> Result<Self, CacheCodecError> {
        decode_json(bytes)
    }
}

macro_rules! scalar_cache_value {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl CacheValue for $ty {
                const SHAPE: CacheShape = CacheShape::Scalar;

                fn encode(&self) -> Result<Vec<u8>, CacheCodecError> {
                    Ok(self.to_string().into_bytes())
                }

                fn decode(bytes: &[u8]) -> Result<Self, CacheCodecError> {
                    let text = std::str::from_utf8(bytes).map_err(|_| CacheCodecError::NotUtf8)?;
                    text.parse()
                        .map_err(|e| CacheCodecError::ScalarParse(format!("{e}")))
                }
            }
        )+
    };
}

scalar_cache_value!(f64, u64, i64, String);

/// Registration of one cacheable read operation.
///
/// Constructed once (typically as a `const`) where the operation is
/// wired up; the type parameter binds the operation to its declared
/// return shape.
#[derive(Debug)]
pub struct CachedOp<T: CacheValue> {
    key_prefix: &'static str,
    operation: &'static str,
    ttl: Option<Duration>,
    _value: PhantomData<fn() -> T>,
}

impl<T: CacheValue> CachedOp<T> {
    pub const fn new(
        key_prefix: &'static str,
        operation: &'static str,
        ttl: Option<Duration>,
    ) -> Self {
        Self {
            key_prefix,
            operation,
            ttl,
            _value: PhantomData,
        }
    }

    pub const fn shape(&self) -> CacheShape {
        T::SHAPE
    }

    pub const fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Start a key for one call of this operation; append the call's
    /// named arguments in declaration order.
    pub fn key(&self) -> CacheKey {
        CacheKey::new(self.key_prefix, self.operation)
    }
}

/// Cache-aside wrapper around a [`CacheStore`].
#[derive(Clone)]
pub struct CacheManager {
    store: Arc<dyn CacheStore>,
    default_ttl: Duration,
}

impl CacheManager {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self::with_default_ttl(store, Self::DEFAULT_TTL)
    }

    pub fn with_default_ttl(store: Arc<dyn CacheStore>, default_ttl: Duration) -> Self {
        Self { store, default_ttl }
    }

    pub const fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Run `fetch` with cache-aside semantics under `key`.
    ///
    /// Exactly one store read per call; at most one store write, only on
    /// a miss whose fetch succeeds. A hit returns the decoded value
    /// without polling `fetch`; a fetch failure propagates untouched and
    /// writes nothing. An entry that no longer decodes (schema drift,
    /// truncated write) is logged and treated as a miss.
    pub async fn get_or_fetch<T, E, F>(
        &self,
        op: &CachedOp<T>,
        key: &CacheKey,
        fetch: F,
    ) -> Result<T, E>
    where
        T: CacheValue,
        F: Future<Output = Result<T, E>>,
    {
        if let Some(bytes) = self.store.get(key.as_str()).await {
            match T::decode(&bytes) {
                Ok(value) => {
                    debug!(key = key.as_str(), shape = ?op.shape(), "cache hit");
                    return Ok(value);
                }
                Err(error) => {
                    warn!(
                        key = key.as_str(),
                        %error,
                        "cached entry failed to decode; refetching"
                    );
                }
            }
        }

        debug!(key = key.as_str(), "cache miss");
        let value = fetch.await?;

        match value.encode() {
            Ok(bytes) => {
                let ttl = op.ttl().unwrap_or(self.default_ttl);
                self.store.set(key.as_str(), bytes, ttl).await;
            }
            Err(error) => {
                warn!(key = key.as_str(), %error, "failed to encode result; not cached");
            }
        }

        Ok(value)
    }
}
