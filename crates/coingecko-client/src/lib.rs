//! Rust client for the [CoinGecko](https://www.coingecko.com/en/api) API
//!
//! # API Coverage
//!
//! - `GET /simple/price` - Spot prices with 24h change and market cap
//! - `GET /coins/{id}/market_chart` - Historical prices, market caps and volumes
//!
//! Any other endpoint can be reached through [`CoinGeckoClient::get`].

mod client;
mod error;

pub use client::CoinGeckoClient;
pub use error::{CoinGeckoError, Result};
