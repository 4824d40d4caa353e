//! Process-local read-through accelerator with per-entry TTLs

use moka::future::Cache;
use moka::Expiry;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::warn;

#[derive(Clone)]
struct TimedValue {
    data: serde_json::Value,
    ttl: Duration,
}

/// Each value expires after the TTL it was written with; overwrites restart the clock.
struct PerEntryTtl;

impl Expiry<String, TimedValue> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &TimedValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &TimedValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Hit/miss counters for the in-memory tier
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EphemeralStats {
    pub entries: u64,
    pub hits: u64,
    pub misses: u64,
}

/// In-memory key/value cache shared by all requests of one process.
///
/// Built once at startup and handed to whoever needs it. It never triggers
/// upstream calls and nothing in it survives a restart.
pub struct EphemeralCache {
    cache: Cache<String, TimedValue>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl EphemeralCache {
    const MAX_ENTRIES: u64 = 10_000;

    pub fn new() -> Self {
        Self::with_capacity(Self::MAX_ENTRIES)
    }

    pub fn with_capacity(max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(PerEntryTtl)
            .build();

        Self {
            cache,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Stored value if present and unexpired
    pub async fn get(&self, key: &str) -> Option<serde_json::Value> {
        match self.cache.get(key).await {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.data)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store `data` under `key` until `ttl` elapses, replacing any earlier value
    pub async fn set(&self, key: &str, data: serde_json::Value, ttl: Duration) {
        self.cache
            .insert(key.to_string(), TimedValue { data, ttl })
            .await;
    }

    /// Typed [`Self::get`]; values of another shape count as absent
    pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key).await?;
        match serde_json::from_value(value) {
            Ok(data) => Some(data),
            Err(e) => {
                warn!(key = %key, error = %e, "Discarding in-memory entry with unexpected shape");
                self.delete(key).await;
                None
            }
        }
    }

    /// Typed [`Self::set`]
    pub async fn set_as<T: Serialize>(&self, key: &str, data: &T, ttl: Duration) {
        match serde_json::to_value(data) {
            Ok(value) => self.set(key, value, ttl).await,
            Err(e) => warn!(key = %key, error = %e, "Skipping in-memory cache write"),
        }
    }

    pub async fn delete(&self, key: &str) {
        self.cache.invalidate(key).await;
    }

    pub fn clear(&self) {
        self.cache.invalidate_all();
    }

    pub fn stats(&self) -> EphemeralStats {
        EphemeralStats {
            entries: self.cache.entry_count(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for EphemeralCache {
    fn default() -> Self {
        Self::new()
    }
}
