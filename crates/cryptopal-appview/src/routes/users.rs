use axum::extract::State;
use axum::Json;
use cryptopal_db::UserPreferences;
use serde_json::{json, Value};
use tracing::info;

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

pub async fn get_preferences(auth: AuthUser) -> Json<Value> {
    Json(json!({ "success": true, "preferences": auth.user.preferences() }))
}

/// Replace preferences wholesale; missing fields reset to empty. Marks the user onboarded.
pub async fn update_preferences(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(preferences): Json<UserPreferences>,
) -> Result<Json<Value>, AppError> {
    let user = cryptopal_db::users::update_preferences(&state.pool, auth.user.id, &preferences)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    info!(user_id = user.id, "Preferences updated");

    Ok(Json(json!({
        "success": true,
        "preferences": user.preferences(),
        "onboarded": user.onboarded,
    })))
}
