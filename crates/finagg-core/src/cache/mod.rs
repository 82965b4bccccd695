mod key;
mod manager;
mod store;

pub use key::CacheKey;
pub use manager::{CacheCodecError, CacheManager, CacheShape, CacheValue, CachedOp};
pub use store::{CacheStore, MemoryCacheStore};
