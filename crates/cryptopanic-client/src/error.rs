//! Error types for the CryptoPanic client

use std::fmt;

/// Errors that can occur when talking to CryptoPanic
#[derive(Debug)]
pub enum CryptoPanicError {
    /// No auth token configured
    MissingApiKey,
    /// Endpoint or parameters did not form a valid URL
    Url(url::ParseError),
    /// HTTP request or body decoding failed
    Http(reqwest::Error),
    /// CryptoPanic answered with a non-success status
    Api { status: u16, message: String },
}

impl CryptoPanicError {
    /// HTTP status returned by CryptoPanic, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl fmt::Display for CryptoPanicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingApiKey => write!(f, "CryptoPanic API key not configured"),
            Self::Url(e) => write!(f, "CryptoPanic URL error: {}", e),
            Self::Http(e) => write!(f, "CryptoPanic HTTP error: {}", e),
            Self::Api { status, message } => {
                write!(f, "CryptoPanic API error: {} {}", status, message)
            }
        }
    }
}

impl std::error::Error for CryptoPanicError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Url(e) => Some(e),
            Self::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for CryptoPanicError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

impl From<url::ParseError> for CryptoPanicError {
    fn from(e: url::ParseError) -> Self {
        Self::Url(e)
    }
}

/// Result type for CryptoPanic operations
pub type Result<T> = std::result::Result<T, CryptoPanicError>;
