//! Error types for the OpenRouter client

use std::fmt;

/// Errors that can occur when talking to OpenRouter
#[derive(Debug)]
pub enum OpenRouterError {
    /// No API key configured
    MissingApiKey,
    /// The model list was empty
    NoModels,
    /// HTTP request or body decoding failed
    Http(reqwest::Error),
    /// OpenRouter answered with a non-success status
    Api { status: u16, message: String },
}

impl OpenRouterError {
    /// HTTP status returned by OpenRouter, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the failure means "this model is not served", so the next one may work
    pub fn is_model_unavailable(&self) -> bool {
        match self {
            Self::Api { status, message } => {
                *status == 404 || message.contains("No endpoints found")
            }
            _ => false,
        }
    }
}

impl fmt::Display for OpenRouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingApiKey => write!(f, "OpenRouter API key not configured"),
            Self::NoModels => write!(f, "No OpenRouter models configured"),
            Self::Http(e) => write!(f, "OpenRouter HTTP error: {}", e),
            Self::Api { status, message } => write!(f, "OpenRouter API error ({}): {}", status, message),
        }
    }
}

impl std::error::Error for OpenRouterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for OpenRouterError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

/// Result type for OpenRouter operations
pub type Result<T> = std::result::Result<T, OpenRouterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_unavailable_classification() {
        let not_found = OpenRouterError::Api {
            status: 404,
            message: "Not Found".into(),
        };
        let no_endpoints = OpenRouterError::Api {
            status: 400,
            message: "No endpoints found for x-ai/grok".into(),
        };
        let rate_limited = OpenRouterError::Api {
            status: 429,
            message: "Rate limit exceeded".into(),
        };

        assert!(not_found.is_model_unavailable());
        assert!(no_endpoints.is_model_unavailable());
        assert!(!rate_limited.is_model_unavailable());
        assert!(!OpenRouterError::MissingApiKey.is_model_unavailable());
    }
}
