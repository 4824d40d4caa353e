pub mod ai;
pub mod health;
pub mod memes;
pub mod news;
pub mod prices;
pub mod users;
pub mod votes;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::state::AppState;

/// All `/api` routes. Unknown `/api` paths answer with a JSON 404 instead of the SPA.
pub fn api_router() -> Router<AppState> {
    let api = Router::new()
        .route("/health", get(health::health))
        .route("/news", get(news::get_news))
        .route("/prices", get(prices::get_prices))
        .route("/prices/{coin_id}/history", get(prices::get_price_history))
        .route("/ai/insight", get(ai::get_insight))
        .route("/memes", get(memes::get_memes))
        // Votes - fixed path before the two-segment wildcard
        .route("/votes", post(votes::create_vote))
        .route("/votes/user", get(votes::get_user_votes))
        .route(
            "/votes/{content_type}/{content_id}",
            get(votes::get_vote_counts).delete(votes::delete_vote),
        )
        .route(
            "/users/preferences",
            get(users::get_preferences).put(users::update_preferences),
        )
        .fallback(api_not_found);

    Router::new().nest("/api", api)
}

async fn api_not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "message": "Route not found" })),
    )
}

/// `{"success": true, "data": ...}`
pub fn data_envelope<T: Serialize>(data: T) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

/// `{"success": true, ...fields of body}`
pub fn flat_envelope<T: Serialize>(body: T) -> Result<Json<Value>, AppError> {
    let mut value = serde_json::to_value(body).map_err(|e| AppError::Internal(e.to_string()))?;
    match value.as_object_mut() {
        Some(fields) => {
            fields.insert("success".to_string(), Value::Bool(true));
            Ok(Json(value))
        }
        None => Err(AppError::Internal("Response body is not an object".into())),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::dashboard::testing::{dashboard, FakeUpstream};
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    /// Router over fakes and a pool that never connects unless a handler reaches SQL
    pub(crate) fn test_router() -> Router {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/cryptopal_test")
            .unwrap();
        let (dashboard, _, _) = dashboard(FakeUpstream::default());
        api_router().with_state(AppState { pool, dashboard })
    }

    pub(crate) async fn body_json(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_protected_routes_require_session() {
        let cases = [
            (Method::GET, "/api/news"),
            (Method::GET, "/api/prices"),
            (Method::GET, "/api/prices/bitcoin/history"),
            (Method::GET, "/api/ai/insight"),
            (Method::GET, "/api/memes"),
            (Method::GET, "/api/votes/user"),
            (Method::GET, "/api/votes/news/1"),
            (Method::DELETE, "/api/votes/news/1"),
            (Method::GET, "/api/users/preferences"),
        ];

        for (method, uri) in cases {
            let response = test_router()
                .oneshot(
                    Request::builder()
                        .method(method)
                        .uri(uri)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
            assert_eq!(body_json(response).await["success"], false);
        }
    }

    #[tokio::test]
    async fn test_non_bearer_authorization_is_rejected() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/votes")
                    .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"contentType":"news","contentId":"1","voteType":"up"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_api_path_is_json_404() {
        let response = test_router()
            .oneshot(Request::builder().uri("/api/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["message"], "Route not found");
    }

    #[test]
    fn test_flat_envelope() {
        let Json(value) = flat_envelope(json!({"counts": {"upvotes": 1}})).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["counts"]["upvotes"], 1);

        assert!(flat_envelope(vec![1, 2]).is_err());
    }
}
