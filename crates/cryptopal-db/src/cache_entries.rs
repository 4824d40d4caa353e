use crate::types::{CacheEntryRow, ClaimRefreshParams};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;

/// Get a cache entry by key
pub async fn find(pool: &PgPool, key: &str) -> Result<Option<CacheEntryRow>, sqlx::Error> {
    sqlx::query_as::<_, CacheEntryRow>(
        r#"
        SELECT key, data, expires_at, api_call_count, created_at, updated_at
        FROM cache_entries
        WHERE key = $1
        "#,
    )
    .bind(key)
    .fetch_optional(pool)
    .await
}

/// Atomically claim one upstream call for `key`.
///
/// Inserts a data-less reservation leased until `lease_until` for unknown
/// keys, or bumps `api_call_count` on a row that is still under `budget` and
/// has expired (or on any row when `ignore_expiry` is set). Re-claimed
/// reservations get a new lease. Returns the new call count when a slot was
/// claimed and `None` otherwise.
pub async fn claim_refresh(
    pool: &PgPool,
    key: &str,
    params: &ClaimRefreshParams,
) -> Result<Option<i32>, sqlx::Error> {
    let row: Option<(i32,)> = sqlx::query_as(
        r#"
        INSERT INTO cache_entries (key, data, expires_at, api_call_count, created_at, updated_at)
        VALUES ($1, NULL, $4, 1, $3, $3)
        ON CONFLICT (key) DO UPDATE
            SET api_call_count = cache_entries.api_call_count + 1,
                expires_at = CASE
                    WHEN cache_entries.data IS NULL THEN EXCLUDED.expires_at
                    ELSE cache_entries.expires_at
                END,
                updated_at = EXCLUDED.updated_at
            WHERE cache_entries.api_call_count < $2
              AND (cache_entries.expires_at <= $3 OR $5)
        RETURNING api_call_count
        "#,
    )
    .bind(key)
    .bind(params.budget)
    .bind(params.now)
    .bind(params.lease_until)
    .bind(params.ignore_expiry)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|r| r.0))
}

/// Store freshly fetched data for a claimed key
pub async fn complete_refresh(
    pool: &PgPool,
    key: &str,
    data: &serde_json::Value,
    expires_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<CacheEntryRow, sqlx::Error> {
    sqlx::query_as::<_, CacheEntryRow>(
        r#"
        INSERT INTO cache_entries (key, data, expires_at, api_call_count, created_at, updated_at)
        VALUES ($1, $2, $3, 1, $4, $4)
        ON CONFLICT (key) DO UPDATE
            SET data = EXCLUDED.data,
                expires_at = EXCLUDED.expires_at,
                updated_at = EXCLUDED.updated_at
        RETURNING key, data, expires_at, api_call_count, created_at, updated_at
        "#,
    )
    .bind(key)
    .bind(Json(data))
    .bind(expires_at)
    .bind(now)
    .fetch_one(pool)
    .await
}

/// Give back a claimed slot after a failed fetch. Reservations that never
/// received data lose their lease and are removed once no claim is left.
pub async fn release_claim(pool: &PgPool, key: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE cache_entries
        SET api_call_count = GREATEST(api_call_count - 1, 0),
            expires_at = CASE WHEN data IS NULL THEN now() ELSE expires_at END,
            updated_at = now()
        WHERE key = $1
        "#,
    )
    .bind(key)
    .execute(pool)
    .await?;

    sqlx::query("DELETE FROM cache_entries WHERE key = $1 AND data IS NULL AND api_call_count = 0")
        .bind(key)
        .execute(pool)
        .await?;
    Ok(())
}

/// Delete rows that expired before `before`, returning how many were removed
pub async fn purge_expired(pool: &PgPool, before: DateTime<Utc>) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM cache_entries WHERE expires_at < $1")
        .bind(before)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
