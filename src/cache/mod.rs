//! Dashboard cache and rate-limit lock
//!
//! Typed view over a [`KeyValueStore`](crate::store::KeyValueStore): one slot
//! for the last successful payload and one slot for the rate-limit lock. Both
//! are JSON under fixed keys and are overwritten in place, never deleted.

mod manager;

pub use manager::{
    CacheEntry, CacheError, DashboardCache, RateLimitLock, CACHE_KEY, RATE_LIMIT_KEY,
};
