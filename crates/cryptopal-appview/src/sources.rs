//! Upstream providers as seen by the dashboard.
//!
//! Each provider sits behind a small trait so orchestration can be exercised
//! without network access. The production implementations are the client crates.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use coingecko_client::{CoinGeckoClient, CoinGeckoError};
use cryptopanic_client::{CryptoPanicClient, CryptoPanicError};
use meme_client::{MemeClient, MemeError, MemeSearchResponse};
use openrouter_client::{ChatMessage, OpenRouterClient, OpenRouterConfig, OpenRouterError};
use serde_json::Value;

use crate::config::Config;

/// A failed upstream call, reduced to what callers need to report it
#[derive(Debug, Clone)]
pub struct UpstreamError {
    pub provider: &'static str,
    pub status: Option<u16>,
    pub message: String,
}

impl UpstreamError {
    pub fn new(provider: &'static str, status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            provider,
            status,
            message: message.into(),
        }
    }
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} request failed: {}", self.provider, self.message)
    }
}

impl std::error::Error for UpstreamError {}

impl From<CryptoPanicError> for UpstreamError {
    fn from(e: CryptoPanicError) -> Self {
        Self::new("CryptoPanic", e.status(), e.to_string())
    }
}

impl From<CoinGeckoError> for UpstreamError {
    fn from(e: CoinGeckoError) -> Self {
        Self::new("CoinGecko", e.status(), e.to_string())
    }
}

impl From<OpenRouterError> for UpstreamError {
    fn from(e: OpenRouterError) -> Self {
        Self::new("OpenRouter", e.status(), e.to_string())
    }
}

impl From<MemeError> for UpstreamError {
    fn from(e: MemeError) -> Self {
        Self::new("Meme API", e.status(), e.to_string())
    }
}

#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Hot public posts for a comma-separated currency list
    async fn hot_posts(&self, currencies: &str) -> Result<Value, UpstreamError>;
}

#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn simple_price(&self, coin_ids: &[String]) -> Result<Value, UpstreamError>;

    async fn market_chart(&self, coin_id: &str, days: &str) -> Result<Value, UpstreamError>;
}

#[async_trait]
pub trait InsightSource: Send + Sync {
    /// Raw chat-completion response
    async fn complete(&self, messages: &[ChatMessage]) -> Result<Value, UpstreamError>;
}

#[async_trait]
pub trait MemeSource: Send + Sync {
    async fn search(&self, keywords: &str, number: u32)
        -> Result<MemeSearchResponse, UpstreamError>;
}

#[async_trait]
impl NewsSource for CryptoPanicClient {
    async fn hot_posts(&self, currencies: &str) -> Result<Value, UpstreamError> {
        Ok(CryptoPanicClient::hot_posts(self, currencies).await?)
    }
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    async fn simple_price(&self, coin_ids: &[String]) -> Result<Value, UpstreamError> {
        Ok(CoinGeckoClient::simple_price(self, coin_ids).await?)
    }

    async fn market_chart(&self, coin_id: &str, days: &str) -> Result<Value, UpstreamError> {
        Ok(CoinGeckoClient::market_chart(self, coin_id, days).await?)
    }
}

#[async_trait]
impl InsightSource for OpenRouterClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<Value, UpstreamError> {
        Ok(self.chat(messages).await?)
    }
}

#[async_trait]
impl MemeSource for MemeClient {
    async fn search(
        &self,
        keywords: &str,
        number: u32,
    ) -> Result<MemeSearchResponse, UpstreamError> {
        Ok(MemeClient::search(self, keywords, number).await?)
    }
}

/// The set of providers the dashboard draws from
#[derive(Clone)]
pub struct Sources {
    pub news: Arc<dyn NewsSource>,
    pub prices: Arc<dyn PriceSource>,
    pub insight: Arc<dyn InsightSource>,
    pub memes: Arc<dyn MemeSource>,
}

impl Sources {
    pub fn from_config(config: &Config) -> Self {
        let openrouter = OpenRouterConfig {
            api_key: config.openrouter.api_key.clone(),
            base_url: config.openrouter.base_url.clone(),
            models: config.openrouter_models.clone(),
            referer: config.frontend_url.clone(),
            ..OpenRouterConfig::default()
        };

        Self {
            news: Arc::new(CryptoPanicClient::with_base_url(
                config.cryptopanic.api_key.clone(),
                &config.cryptopanic.base_url,
            )),
            prices: Arc::new(CoinGeckoClient::with_base_url(
                config.coingecko.api_key.clone(),
                &config.coingecko.base_url,
            )),
            insight: Arc::new(OpenRouterClient::new(openrouter)),
            memes: Arc::new(MemeClient::with_base_url(
                config.memes.api_key.clone(),
                &config.memes.base_url,
            )),
        }
    }
}
