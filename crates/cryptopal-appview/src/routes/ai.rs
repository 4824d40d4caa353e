use axum::extract::State;
use axum::Json;
use serde_json::Value;

use super::data_envelope;
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

pub async fn get_insight(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, AppError> {
    let insight = state
        .dashboard
        .daily_insight(&auth.user.preferences())
        .await?;
    Ok(data_envelope(insight))
}
