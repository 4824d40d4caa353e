use std::fmt;

use chrono::{SecondsFormat, Utc};
use cryptopal_db::UserPreferences;
use meme_client::Meme;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ts_rs::TS;

use super::{keys, Dashboard, DashboardError};
use crate::constants::{FALLBACK_MEME_KEYWORD, MEMES_PER_REQUEST, MEMES_TTL};
use crate::sources::UpstreamError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MemeItem {
    pub id: String,
    pub title: String,
    pub image: String,
    pub url: Option<String>,
    pub description: Option<String>,
    /// Credit line: the provider's source link or author
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct MemeFeed {
    /// Keyword picked from the user's preferences
    pub keyword: String,
    /// Keyword the results were actually found for
    pub resolved_keyword: String,
    pub results: Vec<MemeItem>,
    pub fetched_at: String,
    #[serde(default)]
    pub fallback_used: bool,
}

/// Why a meme search produced nothing to show
#[derive(Debug)]
pub enum MemeFetchError {
    NoMemes { keyword: String, api_results: usize },
    Upstream(UpstreamError),
}

impl fmt::Display for MemeFetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMemes { keyword, .. } => {
                write!(f, "No memes returned for keyword \"{}\"", keyword)
            }
            Self::Upstream(e) => write!(f, "{}", e),
        }
    }
}

impl From<UpstreamError> for MemeFetchError {
    fn from(e: UpstreamError) -> Self {
        Self::Upstream(e)
    }
}

impl From<MemeFetchError> for DashboardError {
    fn from(e: MemeFetchError) -> Self {
        match e {
            MemeFetchError::NoMemes { .. } => Self::NotFound(e.to_string()),
            MemeFetchError::Upstream(e) => Self::Upstream(e),
        }
    }
}

impl Dashboard {
    /// Memes for today's keyword, retrying with the generic keyword when it finds nothing
    pub async fn memes(&self, preferences: &UserPreferences) -> Result<MemeFeed, DashboardError> {
        let requested = keys::meme_keyword(preferences, Utc::now().date_naive());
        let normalized = keys::normalize_keyword(&requested);
        let key = keys::meme_key(&normalized);

        if let Some(hit) = self.remembered(&key).await {
            return Ok(hit);
        }

        let feed = match self.cached_memes(&key, &requested, &normalized).await {
            Ok(feed) => feed,
            Err(cryptopal_cache::CacheError::Fetch(MemeFetchError::NoMemes {
                keyword,
                api_results,
            })) if normalized != FALLBACK_MEME_KEYWORD => {
                warn!(
                    keyword = %keyword,
                    api_results,
                    fallback = FALLBACK_MEME_KEYWORD,
                    "No memes for keyword, falling back"
                );
                let fallback_key = keys::meme_key(FALLBACK_MEME_KEYWORD);
                let fallback = self
                    .cached_memes(&fallback_key, FALLBACK_MEME_KEYWORD, FALLBACK_MEME_KEYWORD)
                    .await?;
                MemeFeed {
                    keyword: requested.clone(),
                    fallback_used: true,
                    ..fallback
                }
            }
            Err(e) => return Err(e.into()),
        };

        self.remember(&key, &feed, MEMES_TTL).await;
        Ok(feed)
    }

    async fn cached_memes(
        &self,
        key: &str,
        display_keyword: &str,
        api_keyword: &str,
    ) -> Result<MemeFeed, cryptopal_cache::CacheError<MemeFetchError>> {
        let source = self.sources.memes.clone();
        let display_keyword = display_keyword.to_string();
        let api_keyword = api_keyword.to_string();

        self.persistent(key, MEMES_TTL, || async move {
            debug!(keyword = %display_keyword, api_keyword = %api_keyword, "Fetching memes");
            let response = source.search(&api_keyword, MEMES_PER_REQUEST).await?;
            let results = format_memes(&response.memes);

            if results.is_empty() {
                return Err(MemeFetchError::NoMemes {
                    keyword: display_keyword,
                    api_results: response.memes.len(),
                });
            }

            Ok(MemeFeed {
                keyword: display_keyword,
                resolved_keyword: api_keyword,
                results,
                fetched_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                fallback_used: false,
            })
        })
        .await
    }
}

/// Keep only hits with an image
fn format_memes(memes: &[Meme]) -> Vec<MemeItem> {
    memes
        .iter()
        .enumerate()
        .filter(|(_, meme)| meme.is_image())
        .filter_map(|(index, meme)| {
            let image = meme.image_url()?.to_string();
            let source = meme.source.clone().filter(|s| !s.is_empty());
            let id = match meme.id {
                Some(id) => id.to_string(),
                None => image.clone(),
            };
            let url = meme
                .url
                .clone()
                .filter(|u| !u.is_empty())
                .or_else(|| source.clone());
            Some(MemeItem {
                id,
                title: meme
                    .display_title()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Crypto Meme #{}", index + 1)),
                url,
                image,
                description: meme.display_description().map(str::to_string),
                source: meme.credit().map(str::to_string),
            })
        })
        .collect()
}
