//! OpenRouter chat-completion client
//!
//! Requests are tried against a list of models in order. A model that
//! OpenRouter reports as unavailable (404 / "No endpoints found") is skipped in
//! favour of the next one; any other failure is returned immediately.

mod client;
mod error;
mod types;

pub use client::{OpenRouterClient, OpenRouterConfig, DEFAULT_MODELS};
pub use error::{OpenRouterError, Result};
pub use types::ChatMessage;
