//! Durable storage behind the persistent cache

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cryptopal_db::{CacheEntryRow, ClaimRefreshParams, PgPool};
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Storage operations the persistent cache needs.
///
/// `claim_refresh` must be atomic: two concurrent claims on the same key may
/// never both succeed once the count has reached the budget, and a data-less
/// reservation is not claimable again until its lease runs out.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn find(&self, key: &str) -> Result<Option<CacheEntryRow>, sqlx::Error>;

    /// Reserve one upstream call for an expired or unknown key. Returns the
    /// call count after the claim, or `None` when no slot was available.
    async fn claim_refresh(
        &self,
        key: &str,
        params: &ClaimRefreshParams,
    ) -> Result<Option<i32>, sqlx::Error>;

    async fn complete_refresh(
        &self,
        key: &str,
        data: &serde_json::Value,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), sqlx::Error>;

    /// Return a claimed slot after a failed fetch
    async fn release_claim(&self, key: &str) -> Result<(), sqlx::Error>;

    async fn purge_expired(&self, before: DateTime<Utc>) -> Result<u64, sqlx::Error>;
}

/// Postgres-backed store (`cache_entries` table)
#[derive(Clone)]
pub struct PgCacheStore {
    pool: PgPool,
}

impl PgCacheStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CacheStore for PgCacheStore {
    async fn find(&self, key: &str) -> Result<Option<CacheEntryRow>, sqlx::Error> {
        cryptopal_db::cache_entries::find(&self.pool, key).await
    }

    async fn claim_refresh(
        &self,
        key: &str,
        params: &ClaimRefreshParams,
    ) -> Result<Option<i32>, sqlx::Error> {
        cryptopal_db::cache_entries::claim_refresh(&self.pool, key, params).await
    }

    async fn complete_refresh(
        &self,
        key: &str,
        data: &serde_json::Value,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        cryptopal_db::cache_entries::complete_refresh(&self.pool, key, data, expires_at, now)
            .await?;
        Ok(())
    }

    async fn release_claim(&self, key: &str) -> Result<(), sqlx::Error> {
        cryptopal_db::cache_entries::release_claim(&self.pool, key).await
    }

    async fn purge_expired(&self, before: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        cryptopal_db::cache_entries::purge_expired(&self.pool, before).await
    }
}

/// In-process store with the same semantics as [`PgCacheStore`].
///
/// Every operation holds a single lock, which gives `claim_refresh` the same
/// atomicity as the conditional upsert in Postgres.
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, CacheEntryRow>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a row as-is
    pub async fn insert(&self, entry: CacheEntryRow) {
        self.entries.lock().await.insert(entry.key.clone(), entry);
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn find(&self, key: &str) -> Result<Option<CacheEntryRow>, sqlx::Error> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn claim_refresh(
        &self,
        key: &str,
        params: &ClaimRefreshParams,
    ) -> Result<Option<i32>, sqlx::Error> {
        let mut entries = self.entries.lock().await;
        match entries.get_mut(key) {
            Some(entry) => {
                let claimable = params.ignore_expiry || entry.expires_at <= params.now;
                if entry.api_call_count < params.budget && claimable {
                    entry.api_call_count += 1;
                    if entry.data.is_none() {
                        entry.expires_at = params.lease_until;
                    }
                    entry.updated_at = params.now;
                    Ok(Some(entry.api_call_count))
                } else {
                    Ok(None)
                }
            }
            None => {
                entries.insert(
                    key.to_string(),
                    CacheEntryRow {
                        key: key.to_string(),
                        data: None,
                        expires_at: params.lease_until,
                        api_call_count: 1,
                        created_at: params.now,
                        updated_at: params.now,
                    },
                );
                Ok(Some(1))
            }
        }
    }

    async fn complete_refresh(
        &self,
        key: &str,
        data: &serde_json::Value,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        let mut entries = self.entries.lock().await;
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| CacheEntryRow {
                key: key.to_string(),
                data: None,
                expires_at,
                api_call_count: 1,
                created_at: now,
                updated_at: now,
            });
        entry.data = Some(data.clone());
        entry.expires_at = expires_at;
        entry.updated_at = now;
        Ok(())
    }

    async fn release_claim(&self, key: &str) -> Result<(), sqlx::Error> {
        let mut entries = self.entries.lock().await;
        let remove = match entries.get_mut(key) {
            Some(entry) => {
                entry.api_call_count = (entry.api_call_count - 1).max(0);
                if entry.data.is_none() {
                    entry.expires_at = Utc::now();
                }
                entry.data.is_none() && entry.api_call_count == 0
            }
            None => false,
        };
        if remove {
            entries.remove(key);
        }
        Ok(())
    }

    async fn purge_expired(&self, before: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let mut entries = self.entries.lock().await;
        let start = entries.len();
        entries.retain(|_, e| e.expires_at >= before);
        Ok((start - entries.len()) as u64)
    }
}
