use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;

/// Durable cache row. `data` is `None` while the first refresh for a key is in flight.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CacheEntryRow {
    pub key: String,
    pub data: Option<serde_json::Value>,
    pub expires_at: DateTime<Utc>,
    pub api_call_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User row returned from SELECT queries
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub onboarded: bool,
    pub crypto_assets: Vec<String>,
    pub investor_type: String,
    pub content_types: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    pub fn preferences(&self) -> UserPreferences {
        UserPreferences {
            crypto_assets: self.crypto_assets.clone(),
            investor_type: self.investor_type.clone(),
            content_types: self.content_types.clone(),
        }
    }
}

/// Dashboard personalisation chosen during onboarding
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct UserPreferences {
    #[serde(default)]
    pub crypto_assets: Vec<String>,
    #[serde(default)]
    pub investor_type: String,
    #[serde(default)]
    pub content_types: Vec<String>,
}

/// Vote row returned from SELECT queries
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, TS)]
#[ts(export, export_to = "bindings/")]
pub struct VoteRow {
    pub id: i64,
    pub user_id: i64,
    pub user_name: Option<String>,
    pub content_type: String,
    pub content_id: String,
    pub vote_type: String,
    pub keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for claiming an upstream call on a cache key
#[derive(Debug, Clone, Copy)]
pub struct ClaimRefreshParams {
    pub budget: i32,
    pub now: DateTime<Utc>,
    /// Expiry given to a data-less reservation while its fetch is in flight
    pub lease_until: DateTime<Utc>,
    /// Claim an unexpired row too; set when its stored data can no longer be read
    pub ignore_expiry: bool,
}

/// Parameters for upserting a vote
#[derive(Debug, Clone)]
pub struct UpsertVoteParams {
    pub user_id: i64,
    pub user_name: String,
    pub content_type: String,
    pub content_id: String,
    pub vote_type: String,
    pub keywords: Vec<String>,
}
