use chrono::{DateTime, SecondsFormat, Utc};
use cryptopal_db::UserPreferences;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use ts_rs::TS;

use super::{keys, Dashboard, DashboardError};
use crate::constants::{NEWS_LIMIT, NEWS_TTL};
use crate::sources::UpstreamError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub created_at: String,
    pub published_at: Option<String>,
    /// e.g. `Mar 4, 2025`
    pub formatted_date: String,
    /// e.g. `Mar 4, 2025, 09:30 AM`, empty when unknown
    pub formatted_published_date: String,
    pub description: Option<String>,
    pub kind: String,
    pub slug: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NewsFeed {
    pub results: Vec<NewsItem>,
    /// Number of posts upstream returned, before truncation
    pub count: usize,
}

impl Dashboard {
    /// Hot news for the user's categories. Never empty.
    pub async fn news(&self, preferences: &UserPreferences) -> Result<NewsFeed, DashboardError> {
        let key = keys::news_key(preferences);
        let currencies = keys::news_currencies(preferences);
        let source = self.sources.news.clone();

        let feed = self
            .resolve(&key, NEWS_TTL, || async move {
                let data = source.hot_posts(&currencies).await?;
                Ok::<_, UpstreamError>(format_news(&data, Utc::now()))
            })
            .await?;
        Ok(feed)
    }
}

/// Posts in whichever shape upstream used: `results` array, single `results`
/// object, or a bare array
fn post_list(data: &Value) -> Vec<&Value> {
    match data.get("results") {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(Value::Null) | None => match data {
            Value::Array(items) => items.iter().collect(),
            _ => Vec::new(),
        },
        Some(single) => vec![single],
    }
}

pub fn format_news(data: &Value, now: DateTime<Utc>) -> NewsFeed {
    let posts = post_list(data);
    if posts.is_empty() {
        warn!("No news results from upstream, returning fallback");
        return fallback_news(now);
    }

    let results = posts
        .iter()
        .take(NEWS_LIMIT)
        .enumerate()
        .map(|(index, post)| format_post(post, index, now))
        .collect();

    NewsFeed {
        results,
        count: posts.len(),
    }
}

fn fallback_news(now: DateTime<Utc>) -> NewsFeed {
    NewsFeed {
        results: vec![NewsItem {
            id: "fallback_1".to_string(),
            title: "Crypto markets continue to evolve".to_string(),
            created_at: iso(now),
            published_at: None,
            formatted_date: short_date(now),
            formatted_published_date: String::new(),
            description: None,
            kind: "news".to_string(),
            slug: None,
            url: None,
        }],
        count: 1,
    }
}

fn format_post(post: &Value, index: usize, now: DateTime<Utc>) -> NewsItem {
    let created_at = text(post, "created_at");
    let published_at = text(post, "published_at");

    let formatted_date = created_at
        .as_deref()
        .and_then(parse_timestamp)
        .map(short_date)
        .unwrap_or_else(|| short_date(now));

    let formatted_published_date = published_at
        .as_deref()
        .and_then(parse_timestamp)
        .map(|t| t.format("%b %-d, %Y, %I:%M %p").to_string())
        .unwrap_or_default();

    let id = match post.get("id") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => format!("news_{}", index),
    };

    let description = text(post, "description")
        .or_else(|| text(post, "text"))
        .or_else(|| text(post, "subtitle"))
        .or_else(|| {
            post.pointer("/metadata/description")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        });

    NewsItem {
        id,
        title: text(post, "title").unwrap_or_else(|| "No title".to_string()),
        created_at: created_at.unwrap_or_else(|| iso(now)),
        published_at,
        formatted_date,
        formatted_published_date,
        description,
        kind: text(post, "kind").unwrap_or_else(|| "news".to_string()),
        slug: text(post, "slug"),
        url: text(post, "url"),
    }
}

fn text(post: &Value, field: &str) -> Option<String> {
    post.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

fn iso(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn short_date(t: DateTime<Utc>) -> String {
    t.format("%b %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::testing::{dashboard, FakeUpstream};
    use serde_json::json;

    fn post(i: usize) -> Value {
        json!({
            "id": 1000 + i,
            "title": format!("Post {i}"),
            "created_at": "2025-03-04T09:30:00Z",
            "published_at": "2025-03-04T14:05:00Z",
            "text": "body",
            "kind": "news",
            "slug": format!("post-{i}"),
        })
    }

    #[tokio::test]
    async fn test_zero_results_yield_one_fallback_item() {
        let (dashboard, _, _) = dashboard(FakeUpstream {
            news: Some(json!({"results": []})),
            ..FakeUpstream::default()
        });

        let feed = dashboard.news(&UserPreferences::default()).await.unwrap();

        assert_eq!(feed.results.len(), 1);
        assert_eq!(feed.count, 1);
        let item = &feed.results[0];
        assert!(!item.title.is_empty());
        assert!(DateTime::parse_from_rfc3339(&item.created_at).is_ok());
    }

    #[tokio::test]
    async fn test_results_are_truncated_and_normalized() {
        let posts: Vec<Value> = (0..12).map(post).collect();
        let (dashboard, _, _) = dashboard(FakeUpstream {
            news: Some(json!({ "results": posts })),
            ..FakeUpstream::default()
        });

        let feed = dashboard.news(&UserPreferences::default()).await.unwrap();

        assert_eq!(feed.results.len(), NEWS_LIMIT);
        assert_eq!(feed.count, 12);
        let first = &feed.results[0];
        assert_eq!(first.id, "1000");
        assert_eq!(first.description.as_deref(), Some("body"));
        assert_eq!(first.formatted_date, "Mar 4, 2025");
        assert_eq!(first.formatted_published_date, "Mar 4, 2025, 02:05 PM");
    }

    #[tokio::test]
    async fn test_repeat_requests_do_not_refetch() {
        let (dashboard, fake, store) = dashboard(FakeUpstream {
            news: Some(json!({ "results": [post(0)] })),
            ..FakeUpstream::default()
        });
        let prefs = UserPreferences {
            crypto_assets: vec!["Ethereum".into(), "Bitcoin".into()],
            ..UserPreferences::default()
        };

        dashboard.news(&prefs).await.unwrap();
        dashboard.news(&prefs).await.unwrap();

        assert_eq!(fake.calls(), 1);
        assert!(cryptopal_cache::CacheStore::find(store.as_ref(), "news_Bitcoin_Ethereum")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_upstream_failure_without_cache_is_an_error() {
        let (dashboard, _, store) = dashboard(FakeUpstream::default());

        let err = dashboard.news(&UserPreferences::default()).await.unwrap_err();

        assert_eq!(err.status_hint(), Some(502));
        assert!(store.is_empty().await);
    }

    #[test]
    fn test_post_list_shapes() {
        let now = Utc::now();
        assert_eq!(format_news(&json!({"results": post(1)}), now).count, 1);
        assert_eq!(format_news(&json!([post(1), post(2)]), now).count, 2);
        assert_eq!(format_news(&json!({}), now).results[0].id, "fallback_1");
    }

    #[test]
    fn test_missing_fields_get_defaults() {
        let now = Utc::now();
        let feed = format_news(&json!({"results": [{"metadata": {"description": "meta"}}]}), now);
        let item = &feed.results[0];

        assert_eq!(item.id, "news_0");
        assert_eq!(item.title, "No title");
        assert_eq!(item.kind, "news");
        assert_eq!(item.description.as_deref(), Some("meta"));
        assert_eq!(item.formatted_published_date, "");
    }
}
