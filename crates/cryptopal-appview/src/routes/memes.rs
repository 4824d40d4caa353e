use axum::extract::State;
use axum::Json;
use serde_json::Value;

use super::data_envelope;
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

pub async fn get_memes(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, AppError> {
    let feed = state.dashboard.memes(&auth.user.preferences()).await?;
    Ok(data_envelope(feed))
}
