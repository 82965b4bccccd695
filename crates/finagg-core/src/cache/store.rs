//! Key-value byte store behind the cache manager.
//!
//! The store contract mirrors what any TTL-capable KV backend offers:
//! `get` returns the bytes or nothing, `set` writes with a TTL. No
//! transactions, no compare-and-swap.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

/// Byte-oriented TTL key-value store consumed by [`crate::CacheManager`].
pub trait CacheStore: Send + Sync {
    fn get<'a>(
        &'a self,
        key: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<Vec<u8>>> + Send + 'a>>;

    fn set<'a>(
        &'a self,
        key: &'a str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>>;
}

#[derive(Debug, Clone)]
struct StoreEntry {
    bytes: Vec<u8>,
    expires_at: Instant,
}

#[derive(Debug, Default)]
struct StoreInner {
    map: HashMap<String, StoreEntry>,
}

impl StoreInner {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.map.get(key).and_then(|entry| {
            if Instant::now() <= entry.expires_at {
                Some(entry.bytes.clone())
            } else {
                None
            }
        })
    }

    fn set(&mut self, key: String, bytes: Vec<u8>, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        self.map.insert(key, StoreEntry { bytes, expires_at });
    }

    fn clear_expired(&mut self) {
        let now = Instant::now();
        self.map.retain(|_, entry| entry.expires_at > now);
    }

    fn len(&self) -> usize {
        self.map.len()
    }
}

/// Thread-safe in-memory TTL store.
///
/// Suitable for single-process deployments and tests; a shared backend
/// implements the same [`CacheStore`] contract. Expiry is measured on
/// the tokio clock, so paused-time tests can advance it synthetically.
#[derive(Debug, Clone, Default)]
pub struct MemoryCacheStore {
    inner: Arc<tokio::sync::RwLock<StoreInner>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove expired entries.
    pub async fn clear_expired(&self) {
        let mut store = self.inner.write().await;
        store.clear_expired();
    }

    /// Number of entries, including not-yet-collected expired ones.
    pub async fn len(&self) -> usize {
        let store = self.inner.read().await;
        store.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl CacheStore for MemoryCacheStore {
    fn get<'a>(
        &'a self,
        key: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<Vec<u8>>> + Send + 'a>> {
        Box::pin(async move {
            let store = self.inner.read().await;
            store.get(key)
        })
    }

    fn set<'a>(
        &'a self,
        key: &'a str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            if ttl.is_zero() {
                return;
            }

            let mut store = self.inner.write().await;
            store.set(key.to_owned(), value, ttl);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_and_set_round_trip() {
        let store = MemoryCacheStore::new();

        assert!(store.get("k1").await.is_none());

        store.set("k1", b"v1".to_vec(), Duration::from_secs(1)).await;
        assert_eq!(store.get("k1").await, Some(b"v1".to_vec()));

        store.set("k1", b"v2".to_vec(), Duration::from_secs(1)).await;
        assert_eq!(store.get("k1").await, Some(b"v2".to_vec()));
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let store = MemoryCacheStore::new();

        store
            .set("k1", b"v1".to_vec(), Duration::from_secs(60))
            .await;
        assert!(store.get("k1").await.is_some());

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(store.get("k1").await.is_none());
    }

    #[tokio::test]
    async fn zero_ttl_writes_nothing() {
        let store = MemoryCacheStore::new();

        store.set("k1", b"v1".to_vec(), Duration::ZERO).await;
        assert!(store.get("k1").await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn clear_expired_drops_stale_entries() {
        let store = MemoryCacheStore::new();

        store.set("k1", b"v1".to_vec(), Duration::from_secs(60)).await;
        store
            .set("k2", b"v2".to_vec(), Duration::from_secs(3600))
            .await;
        assert_eq!(store.len().await, 2);

        tokio::time::advance(Duration::from_secs(61)).await;
        store.clear_expired().await;
        assert_eq!(store.len().await, 1);
        assert!(store.get("k2").await.is_some());
    }
}
