//! Per-domain fetch orchestration in front of the two cache tiers.
//!
//! Every domain follows the same path: derive a key from the user's
//! preferences, try the in-memory cache, fall through to the persistent cache
//! (which may call upstream), then remember the result in memory. What happens
//! when upstream returns nothing useful is decided per domain.

pub mod insight;
pub mod keys;
pub mod memes;
pub mod news;
pub mod prices;

#[cfg(test)]
pub mod testing;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use cryptopal_cache::{CacheError, EphemeralCache, EphemeralStats, PersistentCache};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::constants::CacheTtl;
use crate::sources::{Sources, UpstreamError};

/// Failures that survive every fallback
#[derive(Debug)]
pub enum DashboardError {
    /// Missing or malformed request input
    InvalidInput(String),
    /// The requested data does not exist upstream or in cache
    NotFound(String),
    /// The key's call budget is spent and nothing was ever stored
    BudgetExhausted { key: String },
    /// Upstream failed and nothing was cached
    Upstream(UpstreamError),
    Serialize(serde_json::Error),
    Store(sqlx::Error),
}

impl DashboardError {
    /// HTTP status the web layer should answer with, if not a plain 500
    pub fn status_hint(&self) -> Option<u16> {
        match self {
            Self::InvalidInput(_) => Some(400),
            Self::NotFound(_) => Some(404),
            Self::BudgetExhausted { .. } => Some(503),
            Self::Upstream(_) => Some(502),
            Self::Serialize(_) | Self::Store(_) => None,
        }
    }
}

impl fmt::Display for DashboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(msg) | Self::NotFound(msg) => write!(f, "{}", msg),
            Self::BudgetExhausted { key } => {
                write!(f, "No cached data available for {} and API limit reached", key)
            }
            Self::Upstream(e) => write!(f, "{}", e),
            Self::Serialize(e) => write!(f, "Serialization error: {}", e),
            Self::Store(e) => write!(f, "Cache store error: {}", e),
        }
    }
}

impl std::error::Error for DashboardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Upstream(e) => Some(e),
            Self::Serialize(e) => Some(e),
            Self::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<UpstreamError> for DashboardError {
    fn from(e: UpstreamError) -> Self {
        Self::Upstream(e)
    }
}

impl<E: Into<DashboardError>> From<CacheError<E>> for DashboardError {
    fn from(e: CacheError<E>) -> Self {
        match e {
            CacheError::InvalidKey => Self::InvalidInput("Cache key must not be empty".into()),
            CacheError::Fetch(e) => e.into(),
            CacheError::BudgetExhausted { key } => Self::BudgetExhausted { key },
            CacheError::Serialize(e) => Self::Serialize(e),
            CacheError::Store(e) => Self::Store(e),
        }
    }
}

/// Orchestrates news, prices, AI insight and memes over both cache tiers
#[derive(Clone)]
pub struct Dashboard {
    cache: PersistentCache,
    memory: Arc<EphemeralCache>,
    sources: Sources,
}

impl Dashboard {
    pub fn new(cache: PersistentCache, memory: Arc<EphemeralCache>, sources: Sources) -> Self {
        Self {
            cache,
            memory,
            sources,
        }
    }

    pub fn memory_stats(&self) -> EphemeralStats {
        self.memory.stats()
    }

    async fn remembered<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let hit = self.memory.get_as(key).await;
        if hit.is_some() {
            debug!(key = %key, "In-memory cache hit");
        }
        hit
    }

    async fn remember<T: Serialize>(&self, key: &str, data: &T, ttl: CacheTtl) {
        self.memory.set_as(key, data, ttl.memory).await;
    }

    async fn persistent<T, F, Fut, E>(
        &self,
        key: &str,
        ttl: CacheTtl,
        fetch: F,
    ) -> Result<T, CacheError<E>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        self.cache
            .get_or_create_with_ttl(key, chrono::Duration::hours(ttl.persistent_hours), fetch)
            .await
    }

    /// Memory, then persistent cache, then remember the result in memory
    async fn resolve<T, F, Fut, E>(
        &self,
        key: &str,
        ttl: CacheTtl,
        fetch: F,
    ) -> Result<T, CacheError<E>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        if let Some(hit) = self.remembered(key).await {
            return Ok(hit);
        }

        let data = self.persistent(key, ttl, fetch).await?;
        self.remember(key, &data, ttl).await;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_hints() {
        assert_eq!(DashboardError::InvalidInput("x".into()).status_hint(), Some(400));
        assert_eq!(DashboardError::NotFound("x".into()).status_hint(), Some(404));
        assert_eq!(
            DashboardError::BudgetExhausted { key: "k".into() }.status_hint(),
            Some(503)
        );
        assert_eq!(
            DashboardError::Upstream(UpstreamError::new("CoinGecko", None, "down")).status_hint(),
            Some(502)
        );
    }

    #[test]
    fn test_cache_error_conversion() {
        let err: DashboardError = CacheError::<UpstreamError>::BudgetExhausted {
            key: "prices_bitcoin_ethereum".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "No cached data available for prices_bitcoin_ethereum and API limit reached"
        );

        let err: DashboardError =
            CacheError::Fetch(UpstreamError::new("CryptoPanic", Some(429), "Too Many Requests"))
                .into();
        assert!(matches!(err, DashboardError::Upstream(ref e) if e.status == Some(429)));
    }
}
