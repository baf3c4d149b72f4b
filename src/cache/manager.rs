//! Cache manager for the dashboard payload and the rate-limit lock
//!
//! Reads never fail: a missing, unreadable or corrupt slot is reported as
//! absent (and logged), so the refresh controller can fall through to the
//! next branch of its decision tree.

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use crate::data::LeagueData;
use crate::store::{KeyValueStore, StoreError};

/// Store key of the cached dashboard payload
pub const CACHE_KEY: &str = "fpl_dashboard_cache";

/// Store key of the rate-limit lock
pub const RATE_LIMIT_KEY: &str = "fpl_rate_limit_lock";

/// Errors raised when writing a slot
#[derive(Debug, Error)]
pub enum CacheError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to serialize cache value: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The last successfully fetched payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// When the payload was fetched
    pub timestamp: DateTime<Utc>,
    pub content: LeagueData,
}

impl CacheEntry {
    pub fn new(timestamp: DateTime<Utc>, content: LeagueData) -> Self {
        Self { timestamp, content }
    }

    /// Time elapsed since the payload was fetched
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.timestamp
    }

    /// True while `now - timestamp < ttl`
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.age(now) < ttl
    }
}

/// Written when upstream answers 429; expires on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitLock {
    pub blocked_until: DateTime<Utc>,
}

impl RateLimitLock {
    pub fn until(blocked_until: DateTime<Utc>) -> Self {
        Self { blocked_until }
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.blocked_until
    }

    /// Whole minutes left, rounded up; zero once the lock has expired
    pub fn minutes_remaining(&self, now: DateTime<Utc>) -> i64 {
        let ms = (self.blocked_until - now).num_milliseconds();
        if ms <= 0 {
            0
        } else {
            (ms + 59_999) / 60_000
        }
    }
}

/// Typed access to the two cache slots of a store
#[derive(Debug, Clone)]
pub struct DashboardCache<S> {
    store: S,
}

impl<S: KeyValueStore> DashboardCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads the cached payload, if any
    pub fn read_entry(&self) -> Option<CacheEntry> {
        self.read_slot(CACHE_KEY)
    }

    /// Overwrites the cached payload
    pub fn write_entry(&self, entry: &CacheEntry) -> Result<(), CacheError> {
        self.write_slot(CACHE_KEY, entry)
    }

    /// Reads the rate-limit lock, whether or not it is still active
    pub fn read_lock(&self) -> Option<RateLimitLock> {
        self.read_slot(RATE_LIMIT_KEY)
    }

    /// Overwrites the rate-limit lock
    pub fn write_lock(&self, lock: &RateLimitLock) -> Result<(), CacheError> {
        self.write_slot(RATE_LIMIT_KEY, lock)
    }

    fn read_slot<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache slot unreadable, treating as empty");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "cache slot corrupt, treating as empty");
                None
            }
        }
    }

    fn write_slot<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let json = serde_json::to_string(value)?;
        self.store.set(key, &json)?;
        Ok(())
    }
}
