//! Response types for meme search

use serde::{Deserialize, Serialize};

/// One search hit. Only `url` is guaranteed; the other media and credit
/// fields show up depending on where the meme was sourced from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Meme {
    pub id: Option<i64>,
    pub description: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    pub image: Option<String>,
    pub picture: Option<String>,
    pub thumbnail: Option<String>,
    pub title: Option<String>,
    pub name: Option<String>,
    pub text: Option<String>,
    pub excerpt: Option<String>,
    pub source: Option<String>,
    pub author: Option<String>,
}

impl Meme {
    /// Best image link: `image`, then `url`, `picture`, `thumbnail`
    pub fn image_url(&self) -> Option<&str> {
        first_present(&[&self.image, &self.url, &self.picture, &self.thumbnail])
    }

    pub fn display_title(&self) -> Option<&str> {
        first_present(&[&self.title, &self.name])
    }

    pub fn display_description(&self) -> Option<&str> {
        first_present(&[&self.description, &self.text, &self.excerpt])
    }

    /// Where the meme came from: `source`, then `author`
    pub fn credit(&self) -> Option<&str> {
        first_present(&[&self.source, &self.author])
    }

    /// Whether the hit points at an image we can show
    pub fn is_image(&self) -> bool {
        let is_image_type = self
            .media_type
            .as_deref()
            .is_none_or(|t| t.starts_with("image/"));
        self.image_url().is_some() && is_image_type
    }
}

fn first_present<'a>(fields: &[&'a Option<String>]) -> Option<&'a str> {
    fields
        .iter()
        .filter_map(|field| field.as_deref())
        .find(|value| !value.is_empty())
}

/// `GET /search-memes` response body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemeSearchResponse {
    pub memes: Vec<Meme>,
    pub available: Option<i64>,
    pub offset: Option<i64>,
    pub number: Option<i64>,
}
