//! Error types for the meme search client

use std::fmt;

#[derive(Debug)]
pub enum MemeError {
    /// No API key configured
    MissingApiKey,
    /// Endpoint or parameters did not form a valid URL
    Url(url::ParseError),
    /// HTTP request or body decoding failed
    Http(reqwest::Error),
    /// The API answered with a non-success status
    Api { status: u16, message: String },
}

impl MemeError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl fmt::Display for MemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingApiKey => write!(f, "Meme API key not configured"),
            Self::Url(e) => write!(f, "Meme API URL error: {}", e),
            Self::Http(e) => write!(f, "Meme API HTTP error: {}", e),
            Self::Api { status, message } => write!(f, "Meme API error: {} {}", status, message),
        }
    }
}

impl std::error::Error for MemeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Url(e) => Some(e),
            Self::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for MemeError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

impl From<url::ParseError> for MemeError {
    fn from(e: url::ParseError) -> Self {
        Self::Url(e)
    }
}

pub type Result<T> = std::result::Result<T, MemeError>;
