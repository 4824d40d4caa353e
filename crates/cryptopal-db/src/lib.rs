pub mod cache_entries;
pub mod migrate;
pub mod types;
pub mod users;
pub mod votes;

pub use sqlx::postgres::PgPool;
pub use types::*;
