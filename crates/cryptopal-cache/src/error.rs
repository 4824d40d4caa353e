//! Error types for the persistent cache

use std::fmt;

/// Errors returned by [`crate::PersistentCache::get_or_create`].
///
/// `E` is the error type of the caller's fetch function.
#[derive(Debug)]
pub enum CacheError<E> {
    /// Cache keys must be non-empty
    InvalidKey,
    /// The fetch function failed and there was no earlier data to fall back to
    Fetch(E),
    /// The call budget for the key is spent and nothing was ever stored
    BudgetExhausted { key: String },
    /// Fetched data could not be serialized for storage
    Serialize(serde_json::Error),
    /// The backing store failed
    Store(sqlx::Error),
}

impl<E> CacheError<E> {
    /// The fetch error, if this is one
    pub fn fetch_error(&self) -> Option<&E> {
        match self {
            Self::Fetch(e) => Some(e),
            _ => None,
        }
    }
}

impl<E: fmt::Display> fmt::Display for CacheError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidKey => write!(f, "Cache key must not be empty"),
            Self::Fetch(e) => write!(f, "{}", e),
            Self::BudgetExhausted { key } => {
                write!(f, "No cached data available for {} and API limit reached", key)
            }
            Self::Serialize(e) => write!(f, "Cache serialization error: {}", e),
            Self::Store(e) => write!(f, "Cache store error: {}", e),
        }
    }
}

impl<E> std::error::Error for CacheError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fetch(e) => Some(e),
            Self::Serialize(e) => Some(e),
            Self::Store(e) => Some(e),
            _ => None,
        }
    }
}
