//! CryptoPanic HTTP client

use crate::error::{CryptoPanicError, Result};
use std::time::Duration;
use url::Url;

/// Client for the CryptoPanic developer API
pub struct CryptoPanicClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl CryptoPanicClient {
    /// Base URL for the CryptoPanic developer API v2
    pub const DEFAULT_BASE_URL: &'static str = "https://cryptopanic.com/api/developer/v2";

    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, Self::DEFAULT_BASE_URL)
    }

    /// Create a client against a custom base URL (used by tests and proxies)
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

    /// GET `endpoint` with the auth token and `params` as query string
    pub async fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<serde_json::Value> {
        let api_key = self.api_key.as_deref().ok_or(CryptoPanicError::MissingApiKey)?;

        let mut url = Url::parse(&format!("{}{}", self.base_url, endpoint))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("auth_token", api_key);
            for (key, value) in params {
                query.append_pair(key, value);
            }
        }

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CryptoPanicError::Api {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Error").to_string(),
            });
        }

        Ok(response.json().await?)
    }

    /// Trending public posts for a comma-separated list of currency codes
    pub async fn hot_posts(&self, currencies: &str) -> Result<serde_json::Value> {
        self.get(
            "/posts/",
            &[("currencies", currencies), ("filter", "hot"), ("public", "true")],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[tokio::test]
    async fn test_hot_posts_sends_token_and_filters() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/posts/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("auth_token".into(), "secret".into()),
                Matcher::UrlEncoded("currencies".into(), "BTC,ETH".into()),
                Matcher::UrlEncoded("filter".into(), "hot".into()),
                Matcher::UrlEncoded("public".into(), "true".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"results": [{"title": "BTC up"}]}).to_string())
            .create_async()
            .await;

        let client = CryptoPanicClient::with_base_url(Some("secret".into()), &server.url());
        let data = client.hot_posts("BTC,ETH").await.unwrap();

        assert_eq!(data["results"][0]["title"], "BTC up");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/posts/")
            .match_query(Matcher::Any)
            .with_status(429)
            .create_async()
            .await;

        let client = CryptoPanicClient::with_base_url(Some("secret".into()), &server.url());
        let err = client.hot_posts("BTC").await.unwrap_err();

        assert_eq!(err.status(), Some(429));
    }

    #[tokio::test]
    async fn test_missing_key() {
        let client = CryptoPanicClient::with_base_url(None, "http://127.0.0.1:9");
        let err = client.hot_posts("BTC").await.unwrap_err();
        assert!(matches!(err, CryptoPanicError::MissingApiKey));
    }
}
