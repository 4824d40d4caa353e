//! Two-tier cache for metered upstream APIs
//!
//! [`PersistentCache`] is the cache of record: entries live in a [`CacheStore`]
//! (Postgres in production), survive restarts and carry an upstream call count
//! that caps how often a key may be refreshed. Once the budget is spent, or the
//! upstream fails, previously fetched data is served even past its expiry.
//!
//! [`EphemeralCache`] is a process-local, per-entry-TTL map placed in front of
//! the persistent cache. It never calls upstream itself and is always safe to bypass.

mod ephemeral;
mod error;
mod persistent;
mod store;

pub use ephemeral::{EphemeralCache, EphemeralStats};
pub use error::CacheError;
pub use persistent::{PersistentCache, API_CALL_BUDGET, DEFAULT_TTL_HOURS};
pub use store::{CacheStore, MemoryCacheStore, PgCacheStore};
