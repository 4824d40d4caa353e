//! Rust client for the [CryptoPanic](https://cryptopanic.com/developers/api/) news API
//!
//! Responses are returned as raw JSON; callers normalize the shape they need.
//!
//! # Example
//!
//! ```no_run
//! use cryptopanic_client::CryptoPanicClient;
//!
//! # async fn example() -> Result<(), cryptopanic_client::CryptoPanicError> {
//! let client = CryptoPanicClient::new(Some("token".to_string()));
//! let posts = client.hot_posts("BTC,ETH").await?;
//! println!("{}", posts["results"]);
//! # Ok(())
//! # }
//! ```

mod client;
mod error;

pub use client::CryptoPanicClient;
pub use error::{CryptoPanicError, Result};
