use crate::types::{UpsertVoteParams, VoteRow};
use sqlx::PgPool;

/// Create or update a user's vote on a piece of content (one vote per user+content)
pub async fn upsert(pool: &PgPool, p: &UpsertVoteParams) -> Result<VoteRow, sqlx::Error> {
    sqlx::query_as::<_, VoteRow>(
        r#"
        INSERT INTO votes (user_id, user_name, content_type, content_id, vote_type, keywords)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (user_id, content_type, content_id) DO UPDATE
            SET vote_type = EXCLUDED.vote_type,
                keywords = EXCLUDED.keywords,
                user_name = EXCLUDED.user_name,
                updated_at = now()
        RETURNING id, user_id, user_name, content_type, content_id, vote_type, keywords,
                  created_at, updated_at
        "#,
    )
    .bind(p.user_id)
    .bind(&p.user_name)
    .bind(&p.content_type)
    .bind(&p.content_id)
    .bind(&p.vote_type)
    .bind(&p.keywords)
    .fetch_one(pool)
    .await
}

/// Get all votes cast on a piece of content, oldest first
pub async fn get_for_content(
    pool: &PgPool,
    content_type: &str,
    content_id: &str,
) -> Result<Vec<VoteRow>, sqlx::Error> {
    sqlx::query_as::<_, VoteRow>(
        r#"
        SELECT id, user_id, user_name, content_type, content_id, vote_type, keywords,
               created_at, updated_at
        FROM votes
        WHERE content_type = $1 AND content_id = $2
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(content_type)
    .bind(content_id)
    .fetch_all(pool)
    .await
}

/// Get every vote a user has cast
pub async fn get_for_user(pool: &PgPool, user_id: i64) -> Result<Vec<VoteRow>, sqlx::Error> {
    sqlx::query_as::<_, VoteRow>(
        r#"
        SELECT id, user_id, user_name, content_type, content_id, vote_type, keywords,
               created_at, updated_at
        FROM votes
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Delete a user's vote on a piece of content, returning whether one existed
pub async fn delete(
    pool: &PgPool,
    user_id: i64,
    content_type: &str,
    content_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM votes WHERE user_id = $1 AND content_type = $2 AND content_id = $3",
    )
    .bind(user_id)
    .bind(content_type)
    .bind(content_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
