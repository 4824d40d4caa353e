//! CoinGecko HTTP client

use crate::error::{CoinGeckoError, Result};
use std::time::Duration;
use url::Url;

/// Client for the public (or demo-key) CoinGecko API
pub struct CoinGeckoClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl CoinGeckoClient {
    /// Base URL for CoinGecko API v3
    pub const DEFAULT_BASE_URL: &'static str = "https://api.coingecko.com/api/v3";

    /// Header carrying a demo API key
    const API_KEY_HEADER: &'static str = "x-cg-demo-api-key";

    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, Self::DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: Option<String>, base_url: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    /// GET `endpoint` with `params` as query string
    pub async fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<serde_json::Value> {
        let url = Url::parse_with_params(&format!("{}{}", self.base_url, endpoint), params)?;

        let mut request = self.http.get(url);
        if let Some(key) = &self.api_key {
            request = request.header(Self::API_KEY_HEADER, key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CoinGeckoError::Api {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Error").to_string(),
            });
        }

        Ok(response.json().await?)
    }

    /// USD spot prices, 24h change and market cap for the given coin ids
    pub async fn simple_price(&self, coin_ids: &[String]) -> Result<serde_json::Value> {
        let ids = coin_ids.join(",");
        self.get(
            "/simple/price",
            &[
                ("ids", ids.as_str()),
                ("vs_currencies", "usd"),
                ("include_24hr_change", "true"),
                ("include_market_cap", "true"),
            ],
        )
        .await
    }

    /// USD market chart for one coin over the last `days` days
    pub async fn market_chart(&self, coin_id: &str, days: &str) -> Result<serde_json::Value> {
        let endpoint = format!("/coins/{}/market_chart", urlencoding::encode(coin_id));
        self.get(&endpoint, &[("vs_currency", "usd"), ("days", days)])
            .await
    }
}
