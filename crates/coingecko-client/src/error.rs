//! Error types for the CoinGecko client

use std::fmt;

/// Errors that can occur when talking to CoinGecko
#[derive(Debug)]
pub enum CoinGeckoError {
    /// Endpoint or parameters did not form a valid URL
    Url(url::ParseError),
    /// HTTP request or body decoding failed
    Http(reqwest::Error),
    /// CoinGecko answered with a non-success status
    Api { status: u16, message: String },
}

impl CoinGeckoError {
    /// HTTP status returned by CoinGecko, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Url(_) => None,
        }
    }
}

impl fmt::Display for CoinGeckoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(e) => write!(f, "CoinGecko URL error: {}", e),
            Self::Http(e) => write!(f, "CoinGecko HTTP error: {}", e),
            Self::Api { status, message } => write!(f, "CoinGecko API error: {} {}", status, message),
        }
    }
}

impl std::error::Error for CoinGeckoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Url(e) => Some(e),
            Self::Http(e) => Some(e),
            Self::Api { .. } => None,
        }
    }
}

impl From<reqwest::Error> for CoinGeckoError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

impl From<url::ParseError> for CoinGeckoError {
    fn from(e: url::ParseError) -> Self {
        Self::Url(e)
    }
}

/// Result type for CoinGecko operations
pub type Result<T> = std::result::Result<T, CoinGeckoError>;
