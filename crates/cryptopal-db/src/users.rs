use crate::types::{UserPreferences, UserRow};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

const USER_COLUMNS: &str = "u.id, u.email, u.name, u.onboarded, u.crypto_assets, u.investor_type, \
                            u.content_types, u.created_at, u.updated_at";

/// Resolve an unexpired session token to its user
pub async fn get_by_session_token(
    pool: &PgPool,
    token: &str,
    now: DateTime<Utc>,
) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>(&format!(
        r#"
        SELECT {USER_COLUMNS}
        FROM sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.token = $1 AND s.expires_at > $2
        "#
    ))
    .bind(token)
    .bind(now)
    .fetch_optional(pool)
    .await
}

/// Replace a user's preferences and mark them onboarded
pub async fn update_preferences(
    pool: &PgPool,
    id: i64,
    preferences: &UserPreferences,
) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>(&format!(
        r#"
        UPDATE users u
        SET crypto_assets = $2,
            investor_type = $3,
            content_types = $4,
            onboarded = TRUE,
            updated_at = now()
        WHERE u.id = $1
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(&preferences.crypto_assets)
    .bind(&preferences.investor_type)
    .bind(&preferences.content_types)
    .fetch_optional(pool)
    .await
}
