use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

use super::flat_envelope;
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;
use crate::votes::{self, CreateVoteRequest};

pub async fn create_vote(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateVoteRequest>,
) -> Result<Json<Value>, AppError> {
    let result = votes::create_or_update_vote(&state.pool, &auth.user, &body).await?;
    flat_envelope(result)
}

pub async fn get_vote_counts(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((content_type, content_id)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    let summary = votes::vote_counts(&state.pool, auth.user.id, &content_type, &content_id).await?;
    flat_envelope(summary)
}

pub async fn delete_vote(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((content_type, content_id)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    let summary = votes::delete_vote(&state.pool, auth.user.id, &content_type, &content_id).await?;
    let Json(mut body) = flat_envelope(summary)?;
    body["message"] = json!("Vote removed");
    Ok(Json(body))
}

pub async fn get_user_votes(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, AppError> {
    let votes = votes::votes_for_user(&state.pool, auth.user.id).await?;
    Ok(Json(json!({ "success": true, "votes": votes })))
}
