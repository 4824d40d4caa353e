//! Meme search HTTP client

use crate::error::{MemeError, Result};
use crate::types::MemeSearchResponse;
use std::time::Duration;
use url::Url;

pub struct MemeClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl MemeClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.apileague.com";

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

    /// Search memes matching `keywords`, at most `number` results
    pub async fn search(&self, keywords: &str, number: u32) -> Result<MemeSearchResponse> {
        let api_key = self.api_key.as_deref().ok_or(MemeError::MissingApiKey)?;

        let number = number.to_string();
        let url = Url::parse_with_params(
            &format!("{}/search-memes", self.base_url),
            &[("keywords", keywords), ("number", number.as_str())],
        )?;

        let response = self
            .http
            .get(url)
            .header("x-api-key", api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MemeError::Api {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Error").to_string(),
            });
        }

        Ok(response.json().await?)
    }
}
