//! Durable get-or-create cache with a per-key upstream call budget

use crate::error::CacheError;
use crate::store::CacheStore;
use chrono::{DateTime, Duration, Utc};
use cryptopal_db::{CacheEntryRow, ClaimRefreshParams};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Maximum number of successful upstream refreshes recorded per key
pub const API_CALL_BUDGET: i32 = 2;

/// TTL applied by [`PersistentCache::get_or_create`]
pub const DEFAULT_TTL_HOURS: i64 = 24;

/// How long a new key's reservation blocks other refreshes while its first
/// fetch runs. Matches the upstream client timeouts.
const REFRESH_LEASE_SECS: i64 = 30;

/// How often a request waiting on another request's refresh re-reads the row
const PENDING_POLL_INTERVAL: std::time::Duration = std::time::Duration::from_millis(25);

/// Payloads above this serialized size are logged as a summary only
const LARGE_PAYLOAD_BYTES: usize = 500;

/// Cache of record shielding metered upstream APIs.
///
/// Fresh entries are returned without calling upstream. Expired, missing or
/// unreadable entries are refreshed only while the key is under
/// [`API_CALL_BUDGET`]; after that, and whenever the fetch fails, the last
/// stored value is served. Concurrent misses on a new key wait for the first
/// request's fetch instead of spending a second call.
#[derive(Clone)]
pub struct PersistentCache {
    store: Arc<dyn CacheStore>,
}

impl PersistentCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// [`Self::get_or_create_with_ttl`] with a [`DEFAULT_TTL_HOURS`] TTL
    pub async fn get_or_create<T, F, Fut, E>(
        &self,
        key: &str,
        fetch: F,
    ) -> Result<T, CacheError<E>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        self.get_or_create_with_ttl(key, Duration::hours(DEFAULT_TTL_HOURS), fetch)
            .await
    }

    /// Return cached data for `key`, calling `fetch` only when the entry is
    /// missing, expired or unreadable and the key still has call budget left.
    pub async fn get_or_create_with_ttl<T, F, Fut, E>(
        &self,
        key: &str,
        ttl: Duration,
        fetch: F,
    ) -> Result<T, CacheError<E>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        if key.is_empty() {
            return Err(CacheError::InvalidKey);
        }

        let (api_calls, stale) = loop {
            let now = Utc::now();
            let existing = self.store.find(key).await.map_err(CacheError::Store)?;

            let mut stale: Option<T> = None;
            let mut unreadable = false;
            if let Some(entry) = existing {
                if is_pending(&entry, now) {
                    debug!(key = %key, "Waiting for in-flight refresh");
                    tokio::time::sleep(PENDING_POLL_INTERVAL).await;
                    continue;
                }
                let is_fresh = now < entry.expires_at;
                if let Some(value) = entry.data {
                    match decode(key, value) {
                        Some(data) if is_fresh => {
                            debug!(key = %key, "Cache hit");
                            return Ok(data);
                        }
                        Some(data) => stale = Some(data),
                        None => unreadable = true,
                    }
                }
            }

            let params = ClaimRefreshParams {
                budget: API_CALL_BUDGET,
                now,
                lease_until: now + Duration::seconds(REFRESH_LEASE_SECS),
                ignore_expiry: unreadable,
            };
            let claimed = self
                .store
                .claim_refresh(key, &params)
                .await
                .map_err(CacheError::Store)?;

            match claimed {
                Some(count) => break (count, stale),
                None => {
                    if let Some(data) = stale {
                        debug!(
                            key = %key,
                            api_calls = %format!("{}/{}", API_CALL_BUDGET, API_CALL_BUDGET),
                            "Using cached data (API limit reached)"
                        );
                        return Ok(data);
                    }
                    // Another request may have claimed the key since our read
                    match self.store.find(key).await.map_err(CacheError::Store)? {
                        Some(entry) if is_pending(&entry, Utc::now()) => continue,
                        Some(entry) => {
                            if let Some(data) = entry.data.and_then(|v| decode(key, v)) {
                                return Ok(data);
                            }
                        }
                        None => continue,
                    }
                    return Err(CacheError::BudgetExhausted {
                        key: key.to_string(),
                    });
                }
            }
        };

        match fetch().await {
            Ok(fresh) => {
                let value = match serde_json::to_value(&fresh) {
                    Ok(v) => v,
                    Err(e) => {
                        self.release(key).await;
                        return Err(CacheError::Serialize(e));
                    }
                };

                let stored_at = Utc::now();
                if let Err(e) = self
                    .store
                    .complete_refresh(key, &value, stored_at + ttl, stored_at)
                    .await
                {
                    error!(key = %key, error = %e, "Failed to store fresh data");
                }

                log_refresh(key, &value, api_calls);
                Ok(fresh)
            }
            Err(e) => {
                error!(key = %key, error = %e, "Error fetching data");
                self.release(key).await;

                match stale {
                    Some(data) => {
                        warn!(key = %key, "Returning expired cache data");
                        Ok(data)
                    }
                    None => Err(CacheError::Fetch(e)),
                }
            }
        }
    }

    /// Delete rows that expired before `before`
    pub async fn purge_expired(&self, before: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        self.store.purge_expired(before).await
    }

    async fn release(&self, key: &str) {
        if let Err(e) = self.store.release_claim(key).await {
            warn!(key = %key, error = %e, "Failed to release cache claim");
        }
    }
}

/// A data-less reservation whose fetch is still within its lease
fn is_pending(entry: &CacheEntryRow, now: DateTime<Utc>) -> bool {
    entry.data.is_none() && entry.expires_at > now
}

fn decode<T: DeserializeOwned>(key: &str, value: serde_json::Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(data) => Some(data),
        Err(e) => {
            warn!(key = %key, error = %e, "Ignoring cached data with unexpected shape");
            None
        }
    }
}

fn log_refresh(key: &str, value: &serde_json::Value, api_calls: i32) {
    let api_calls = format!("{}/{}", api_calls, API_CALL_BUDGET);
    let serialized = value.to_string();
    if serialized.len() > LARGE_PAYLOAD_BYTES {
        info!(
            key = %key,
            api_calls = %api_calls,
            bytes = serialized.len(),
            "Fetched fresh data (large dataset)"
        );
    } else {
        debug!(key = %key, api_calls = %api_calls, data = %serialized, "Fetched fresh data");
    }
}
