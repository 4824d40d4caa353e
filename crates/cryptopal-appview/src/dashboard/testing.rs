//! In-process fakes for exercising orchestration without network or database

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cryptopal_cache::{EphemeralCache, MemoryCacheStore, PersistentCache};
use meme_client::{Meme, MemeSearchResponse};
use openrouter_client::ChatMessage;
use serde_json::Value;

use super::Dashboard;
use crate::sources::{
    InsightSource, MemeSource, NewsSource, PriceSource, Sources, UpstreamError,
};

/// Canned upstream answers. `None` makes the corresponding call fail.
#[derive(Default)]
pub struct FakeUpstream {
    pub news: Option<Value>,
    pub prices: Option<Value>,
    pub chart: Option<Value>,
    pub completion: Option<Value>,
    /// Search results per exact keyword; unknown keywords find nothing
    pub memes: HashMap<String, Vec<Meme>>,
    pub meme_queries: Mutex<Vec<String>>,
    pub(crate) calls: AtomicUsize,
}

impl FakeUpstream {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn answer(&self, value: &Option<Value>) -> Result<Value, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        value
            .clone()
            .ok_or_else(|| UpstreamError::new("fake", Some(503), "unavailable"))
    }
}

#[async_trait]
impl NewsSource for FakeUpstream {
    async fn hot_posts(&self, _currencies: &str) -> Result<Value, UpstreamError> {
        self.answer(&self.news)
    }
}

#[async_trait]
impl PriceSource for FakeUpstream {
    async fn simple_price(&self, _coin_ids: &[String]) -> Result<Value, UpstreamError> {
        self.answer(&self.prices)
    }

    async fn market_chart(&self, _coin_id: &str, _days: &str) -> Result<Value, UpstreamError> {
        self.answer(&self.chart)
    }
}

#[async_trait]
impl InsightSource for FakeUpstream {
    async fn complete(&self, _messages: &[ChatMessage]) -> Result<Value, UpstreamError> {
        self.answer(&self.completion)
    }
}

#[async_trait]
impl MemeSource for FakeUpstream {
    async fn search(
        &self,
        keywords: &str,
        _number: u32,
    ) -> Result<MemeSearchResponse, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut queries) = self.meme_queries.lock() {
            queries.push(keywords.to_string());
        }
        Ok(MemeSearchResponse {
            memes: self.memes.get(keywords).cloned().unwrap_or_default(),
            ..MemeSearchResponse::default()
        })
    }
}

pub fn image_meme(id: i64, url: &str) -> Meme {
    Meme {
        id: Some(id),
        description: Some(format!("meme {id}")),
        url: Some(url.to_string()),
        media_type: Some("image/png".to_string()),
        ..Meme::default()
    }
}

pub fn sources(fake: Arc<FakeUpstream>) -> Sources {
    Sources {
        news: fake.clone(),
        prices: fake.clone(),
        insight: fake.clone(),
        memes: fake,
    }
}

/// Dashboard over an in-memory store, plus handles to inspect it
pub fn dashboard(fake: FakeUpstream) -> (Dashboard, Arc<FakeUpstream>, Arc<MemoryCacheStore>) {
    let fake = Arc::new(fake);
    let store = Arc::new(MemoryCacheStore::new());
    let dashboard = Dashboard::new(
        PersistentCache::new(store.clone()),
        Arc::new(EphemeralCache::new()),
        sources(fake.clone()),
    );
    (dashboard, fake, store)
}
