use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::Utc;
use cryptopal_db::UserRow;
use sqlx::postgres::PgPool;

use crate::error::AppError;
use crate::state::AppState;

/// Signed-in user resolved from the request's bearer token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: UserRow,
}

/// Axum extractor that validates the session token and returns an [`AuthUser`].
///
/// Sessions are issued by the external auth service; this only checks that the
/// token exists and has not expired.
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?;
        require_auth(&state.pool, token)
            .await
            .map_err(|_| AppError::Unauthorized)
    }
}

/// Token from `Authorization: Bearer <token>`
pub fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Look up the session and return its user
pub async fn require_auth(pool: &PgPool, token: &str) -> Result<AuthUser, ()> {
    match cryptopal_db::users::get_by_session_token(pool, token, Utc::now()).await {
        Ok(Some(user)) => Ok(AuthUser { user }),
        Ok(None) => Err(()),
        Err(e) => {
            tracing::warn!(error = %e, "Session lookup failed");
            Err(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/news");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(&parts_with(Some("Bearer abc123"))), Some("abc123"));
        assert_eq!(bearer_token(&parts_with(Some("Basic abc123"))), None);
        assert_eq!(bearer_token(&parts_with(Some("Bearer   "))), None);
        assert_eq!(bearer_token(&parts_with(None)), None);
    }
}
