use sqlx::migrate::Migrator;
use sqlx::PgPool;
use tracing::info;

/// Schema for cache entries, users, sessions and votes, embedded from `migrations/`
static MIGRATOR: Migrator = sqlx::migrate!();

/// Apply pending migrations (tracked in the `_sqlx_migrations` table)
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::Error> {
    let known = MIGRATOR.iter().count();
    info!(migrations = known, "Applying cryptopal schema");
    MIGRATOR
        .run(pool)
        .await
        .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
    info!("Cryptopal schema up to date");
    Ok(())
}
