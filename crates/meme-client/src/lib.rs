//! Rust client for the [API League](https://apileague.com) meme search API
//!
//! ```no_run
//! use meme_client::MemeClient;
//!
//! # async fn example() -> Result<(), meme_client::MemeError> {
//! let client = MemeClient::new(Some("key".to_string()));
//! let memes = client.search("bitcoin", 3).await?;
//! for meme in memes.memes {
//!     println!("{:?}", meme.url);
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod types;

pub use client::MemeClient;
pub use error::{MemeError, Result};
pub use types::{Meme, MemeSearchResponse};
