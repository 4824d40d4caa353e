use sqlx::postgres::PgPool;

use crate::dashboard::Dashboard;

/// Shared application state passed to all route handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub dashboard: Dashboard,
}
