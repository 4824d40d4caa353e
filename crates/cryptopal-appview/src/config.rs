use std::env;

use openrouter_client::DEFAULT_MODELS;

/// Application configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// Allowed CORS origin; `https://*.vercel.app` is allowed as well
    pub frontend_url: String,
    pub public_path: String,
    pub cryptopanic: ProviderConfig,
    pub coingecko: ProviderConfig,
    pub openrouter: ProviderConfig,
    pub openrouter_models: Vec<String>,
    pub memes: ProviderConfig,
    /// Seconds between purges of long-expired cache rows; 0 disables
    pub cache_purge_interval_secs: u64,
    /// Rows are purged only this many hours after they expire
    pub cache_purge_grace_hours: i64,
}

/// Key and base URL for one upstream provider
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

impl ProviderConfig {
    fn from_env(prefix: &str, default_base_url: &str) -> Self {
        Self {
            api_key: env::var(format!("{prefix}_API_KEY"))
                .ok()
                .filter(|k| !k.is_empty()),
            base_url: env::var(format!("{prefix}_BASE_URL"))
                .unwrap_or_else(|_| default_base_url.to_string()),
        }
    }
}

impl Config {
    /// Parse configuration from environment variables
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5000);

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/cryptopal".to_string());

        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());

        let public_path = env::var("PUBLIC_PATH").unwrap_or_else(|_| "public".to_string());

        let openrouter_models = env::var("OPENROUTER_MODELS")
            .ok()
            .map(|s| parse_list(&s))
            .filter(|models| !models.is_empty())
            .unwrap_or_else(|| DEFAULT_MODELS.iter().map(|m| m.to_string()).collect());

        let cache_purge_interval_secs = env::var("CACHE_PURGE_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3600);

        let cache_purge_grace_hours = env::var("CACHE_PURGE_GRACE_HOURS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(168);

        Self {
            port,
            database_url,
            frontend_url,
            public_path,
            cryptopanic: ProviderConfig::from_env(
                "CRYPTOPANIC",
                cryptopanic_client::CryptoPanicClient::DEFAULT_BASE_URL,
            ),
            coingecko: ProviderConfig::from_env(
                "COINGECKO",
                coingecko_client::CoinGeckoClient::DEFAULT_BASE_URL,
            ),
            openrouter: ProviderConfig::from_env(
                "OPENROUTER",
                openrouter_client::OpenRouterClient::DEFAULT_BASE_URL,
            ),
            openrouter_models,
            memes: ProviderConfig::from_env("MEME", meme_client::MemeClient::DEFAULT_BASE_URL),
            cache_purge_interval_secs,
            cache_purge_grace_hours,
        }
    }
}

fn parse_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}
