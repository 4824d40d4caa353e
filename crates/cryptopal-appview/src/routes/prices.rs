use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use super::data_envelope;
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub days: Option<String>,
}

/// Always succeeds; see [`crate::dashboard::Dashboard::prices`] for the fallbacks
pub async fn get_prices(State(state): State<AppState>, auth: AuthUser) -> Json<Value> {
    let snapshot = state.dashboard.prices(&auth.user.preferences()).await;
    data_envelope(snapshot)
}

pub async fn get_price_history(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(coin_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Value>, AppError> {
    let history = state
        .dashboard
        .price_history(&coin_id, query.days.as_deref())
        .await?;
    Ok(data_envelope(history))
}
