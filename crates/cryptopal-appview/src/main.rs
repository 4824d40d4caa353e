mod auth;
mod config;
mod constants;
mod dashboard;
mod error;
mod routes;
mod sources;
mod state;
mod votes;

use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use chrono::Utc;
use cryptopal_cache::{EphemeralCache, PersistentCache, PgCacheStore};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tracing::{error, info};

use config::Config;
use dashboard::Dashboard;
use sources::Sources;
use state::AppState;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cryptopal_appview=info,cryptopal_cache=info".into()),
        )
        .json()
        .init();

    let config = Config::from_env();
    info!(port = config.port, "Starting cryptopal-appview");

    // Connect to database
    let pool = PgPoolOptions::new()
        .max_connections(20)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    cryptopal_db::migrate::migrate(&pool)
        .await
        .expect("Failed to run migrations");

    let persistent = PersistentCache::new(Arc::new(PgCacheStore::new(pool.clone())));
    spawn_cache_purge(
        persistent.clone(),
        config.cache_purge_interval_secs,
        config.cache_purge_grace_hours,
    );

    let state = AppState {
        pool,
        dashboard: Dashboard::new(
            persistent,
            Arc::new(EphemeralCache::new()),
            Sources::from_config(&config),
        ),
    };

    // CORS
    let frontend_url = config.frontend_url.clone();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            origin
                .to_str()
                .is_ok_and(|origin| is_allowed_origin(origin, &frontend_url))
        }))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    // Serve the SPA with fallback to index.html for client-side routing
    info!(public_path = %config.public_path, "Serving static files");
    let spa_fallback = ServeDir::new(&config.public_path)
        .fallback(ServeFile::new(format!("{}/index.html", config.public_path)));

    let app = routes::api_router()
        .layer(cors)
        .with_state(state)
        .fallback_service(spa_fallback);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("Failed to bind");

    info!(port = config.port, "Listening");

    axum::serve(listener, app).await.expect("Server failed");
}

/// The configured frontend, or any `https://*.vercel.app` deployment
fn is_allowed_origin(origin: &str, frontend_url: &str) -> bool {
    if origin == frontend_url.trim_end_matches('/') {
        return true;
    }
    origin
        .strip_prefix("https://")
        .and_then(|host| host.strip_suffix(".vercel.app"))
        .is_some_and(|sub| !sub.is_empty() && !sub.contains('/'))
}

/// Periodically delete cache rows long past expiry. Rows inside the grace
/// period are kept so stale data can still be served.
fn spawn_cache_purge(cache: PersistentCache, interval_secs: u64, grace_hours: i64) {
    if interval_secs == 0 {
        info!("Cache purge disabled");
        return;
    }

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        loop {
            interval.tick().await;
            let before = Utc::now() - chrono::Duration::hours(grace_hours);
            match cache.purge_expired(before).await {
                Ok(0) => {}
                Ok(deleted) => info!(deleted, "Purged expired cache entries"),
                Err(e) => error!(error = %e, "Cache purge failed"),
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_origins() {
        let frontend = "http://localhost:5173";

        assert!(is_allowed_origin("http://localhost:5173", frontend));
        assert!(is_allowed_origin("https://cryptopal-git-main.vercel.app", frontend));
        assert!(is_allowed_origin("https://app.vercel.app", "https://app.vercel.app/"));

        assert!(!is_allowed_origin("http://localhost:3000", frontend));
        assert!(!is_allowed_origin("http://preview.vercel.app", frontend));
        assert!(!is_allowed_origin("https://.vercel.app", frontend));
        assert!(!is_allowed_origin("https://evil.com/x.vercel.app", frontend));
    }
}
