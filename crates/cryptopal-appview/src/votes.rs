//! Up/down votes on dashboard content and their per-item summaries

use std::collections::BTreeMap;

use cryptopal_db::{UpsertVoteParams, UserRow, VoteRow};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPool;
use ts_rs::TS;

use crate::constants::{ANONYMOUS_VOTER, CONTENT_TYPES, INVESTOR_LABELS, MAX_VOTER_NAMES, VOTE_TYPES};
use crate::error::AppError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct VoteCounts {
    pub upvotes: u32,
    pub downvotes: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Voters {
    pub up: Vec<String>,
    pub down: Vec<String>,
}

/// Aggregate view of all votes on one piece of content
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct VoteSummary {
    pub counts: VoteCounts,
    /// The requesting user's vote, if any
    pub user_vote: Option<String>,
    /// First few voter display names per direction
    pub voters: Voters,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct VoteView {
    pub id: i64,
    pub content_type: String,
    pub content_id: String,
    pub vote_type: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct VoteResult {
    pub vote: VoteView,
    #[serde(flatten)]
    pub summary: VoteSummary,
}

/// Entry of the per-user vote map, keyed `"<contentType>_<contentId>"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct UserVote {
    pub vote_type: String,
    pub keywords: Vec<String>,
    pub content_type: String,
    pub content_id: String,
}

#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct CreateVoteRequest {
    pub content_type: Option<String>,
    pub content_id: Option<String>,
    pub vote_type: Option<String>,
}

pub fn summarize(votes: &[VoteRow], user_id: Option<i64>) -> VoteSummary {
    let mut summary = VoteSummary::default();

    for vote in votes {
        let name = vote
            .user_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(ANONYMOUS_VOTER)
            .to_string();

        let (count, names) = match vote.vote_type.as_str() {
            "up" => (&mut summary.counts.upvotes, &mut summary.voters.up),
            "down" => (&mut summary.counts.downvotes, &mut summary.voters.down),
            _ => continue,
        };
        *count += 1;
        if names.len() < MAX_VOTER_NAMES {
            names.push(name);
        }

        if summary.user_vote.is_none() && user_id == Some(vote.user_id) {
            summary.user_vote = Some(vote.vote_type.clone());
        }
    }

    summary
}

/// Content ids arrive percent-encoded from path segments and some clients
pub fn decode_content_id(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

pub fn validate_content_type(content_type: &str) -> Result<(), AppError> {
    if CONTENT_TYPES.contains(&content_type) {
        Ok(())
    } else {
        Err(AppError::BadRequest("Invalid contentType".into()))
    }
}

/// Checked `(contentType, contentId, voteType)` from a create request
pub fn validate_request(req: &CreateVoteRequest) -> Result<(String, String, String), AppError> {
    let present = |field: &Option<String>| {
        field
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let (Some(content_type), Some(raw_id), Some(vote_type)) = (
        present(&req.content_type),
        present(&req.content_id),
        present(&req.vote_type),
    ) else {
        return Err(AppError::BadRequest(
            "Please provide contentType, contentId, and voteType".into(),
        ));
    };

    let content_id = decode_content_id(&raw_id);
    validate_content_type(&content_type)?;
    if !VOTE_TYPES.contains(&vote_type.as_str()) {
        return Err(AppError::BadRequest(
            "Invalid voteType. Must be \"up\" or \"down\"".into(),
        ));
    }

    Ok((content_type, content_id, vote_type))
}

/// The voter's categories, plus their investor label on AI insights
pub fn keywords_for_vote(content_type: &str, user: &UserRow) -> Vec<String> {
    let mut keywords = user.crypto_assets.clone();

    let investor_type = user.investor_type.trim();
    if content_type == "ai" && !investor_type.is_empty() {
        let label = INVESTOR_LABELS
            .iter()
            .find(|(kind, _)| *kind == investor_type)
            .map(|(_, label)| *label)
            .unwrap_or(investor_type);
        keywords.push(label.to_string());
    }

    keywords
}

pub fn display_name(user: &UserRow) -> String {
    let name = user.name.trim();
    if name.is_empty() {
        ANONYMOUS_VOTER.to_string()
    } else {
        name.to_string()
    }
}

async fn summary_for(
    pool: &PgPool,
    user_id: i64,
    content_type: &str,
    content_id: &str,
) -> Result<VoteSummary, AppError> {
    let votes = cryptopal_db::votes::get_for_content(pool, content_type, content_id).await?;
    Ok(summarize(&votes, Some(user_id)))
}

pub async fn create_or_update_vote(
    pool: &PgPool,
    user: &UserRow,
    req: &CreateVoteRequest,
) -> Result<VoteResult, AppError> {
    let (content_type, content_id, vote_type) = validate_request(req)?;

    let params = UpsertVoteParams {
        user_id: user.id,
        user_name: display_name(user),
        keywords: keywords_for_vote(&content_type, user),
        content_type,
        content_id,
        vote_type,
    };
    let vote = cryptopal_db::votes::upsert(pool, &params).await?;
    let summary = summary_for(pool, user.id, &vote.content_type, &vote.content_id).await?;

    tracing::info!(
        user_id = user.id,
        content_type = %vote.content_type,
        vote_type = %vote.vote_type,
        "Vote recorded"
    );

    Ok(VoteResult {
        vote: VoteView {
            id: vote.id,
            content_type: vote.content_type,
            content_id: vote.content_id,
            vote_type: vote.vote_type,
            keywords: vote.keywords,
        },
        summary,
    })
}

pub async fn vote_counts(
    pool: &PgPool,
    user_id: i64,
    content_type: &str,
    raw_content_id: &str,
) -> Result<VoteSummary, AppError> {
    validate_content_type(content_type)?;
    summary_for(pool, user_id, content_type, &decode_content_id(raw_content_id)).await
}

pub async fn delete_vote(
    pool: &PgPool,
    user_id: i64,
    content_type: &str,
    raw_content_id: &str,
) -> Result<VoteSummary, AppError> {
    validate_content_type(content_type)?;
    let content_id = decode_content_id(raw_content_id);
    cryptopal_db::votes::delete(pool, user_id, content_type, &content_id).await?;
    summary_for(pool, user_id, content_type, &content_id).await
}

pub async fn votes_for_user(
    pool: &PgPool,
    user_id: i64,
) -> Result<BTreeMap<String, UserVote>, AppError> {
    let votes = cryptopal_db::votes::get_for_user(pool, user_id).await?;
    Ok(user_vote_map(votes))
}

fn user_vote_map(votes: Vec<VoteRow>) -> BTreeMap<String, UserVote> {
    votes
        .into_iter()
        .map(|vote| {
            let key = format!("{}_{}", vote.content_type, vote.content_id);
            (
                key,
                UserVote {
                    vote_type: vote.vote_type,
                    keywords: vote.keywords,
                    content_type: vote.content_type,
                    content_id: vote.content_id,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn vote(id: i64, user_id: i64, name: Option<&str>, vote_type: &str) -> VoteRow {
        let now = Utc::now();
        VoteRow {
            id,
            user_id,
            user_name: name.map(str::to_string),
            content_type: "news".into(),
            content_id: "42".into(),
            vote_type: vote_type.into(),
            keywords: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    fn user(name: &str, investor_type: &str, assets: &[&str]) -> UserRow {
        let now = Utc::now();
        UserRow {
            id: 9,
            email: "a@b.c".into(),
            name: name.into(),
            onboarded: true,
            crypto_assets: assets.iter().map(|a| a.to_string()).collect(),
            investor_type: investor_type.into(),
            content_types: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_three_up_one_down() {
        let votes = vec![
            vote(1, 1, Some("Ann"), "up"),
            vote(2, 2, Some("Bo"), "up"),
            vote(3, 3, None, "down"),
            vote(4, 4, Some("Cy"), "up"),
        ];

        let summary = summarize(&votes, Some(3));

        assert_eq!(summary.counts, VoteCounts { upvotes: 3, downvotes: 1 });
        assert_eq!(summary.voters.up, vec!["Ann", "Bo", "Cy"]);
        assert_eq!(summary.voters.down, vec!["Anonymous"]);
        assert_eq!(summary.user_vote.as_deref(), Some("down"));
    }

    #[test]
    fn test_voter_names_are_capped() {
        let votes: Vec<VoteRow> = (0..8)
            .map(|i| vote(i, i, Some(&format!("user{i}")), "up"))
            .collect();

        let summary = summarize(&votes, None);

        assert_eq!(summary.counts.upvotes, 8);
        assert_eq!(summary.voters.up.len(), MAX_VOTER_NAMES);
        assert!(summary.user_vote.is_none());
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let json = serde_json::to_value(summarize(&[vote(1, 1, Some("Ann"), "up")], Some(1))).unwrap();
        assert_eq!(json["counts"]["upvotes"], 1);
        assert_eq!(json["userVote"], "up");
        assert_eq!(json["voters"]["up"][0], "Ann");
    }

    #[test]
    fn test_decode_content_id() {
        assert_eq!(decode_content_id("https%3A%2F%2Fx.io%2Fa"), "https://x.io/a");
        assert_eq!(decode_content_id("plain"), "plain");
        assert_eq!(decode_content_id("%E0%A4%A"), "%E0%A4%A");
    }

    #[test]
    fn test_validate_request() {
        let req = |ct: Option<&str>, id: Option<&str>, vt: Option<&str>| CreateVoteRequest {
            content_type: ct.map(str::to_string),
            content_id: id.map(str::to_string),
            vote_type: vt.map(str::to_string),
        };

        let ok = validate_request(&req(Some("meme"), Some("meme%201"), Some("up"))).unwrap();
        assert_eq!(ok, ("meme".into(), "meme 1".into(), "up".into()));

        assert!(matches!(
            validate_request(&req(Some("news"), None, Some("up"))),
            Err(AppError::BadRequest(m)) if m == "Please provide contentType, contentId, and voteType"
        ));
        assert!(matches!(
            validate_request(&req(Some("tweet"), Some("1"), Some("up"))),
            Err(AppError::BadRequest(m)) if m == "Invalid contentType"
        ));
        assert!(matches!(
            validate_request(&req(Some("news"), Some("1"), Some("sideways"))),
            Err(AppError::BadRequest(m)) if m.starts_with("Invalid voteType")
        ));
    }

    #[test]
    fn test_keywords_for_vote() {
        let hodler = user("Ann", "hodler", &["Bitcoin", "DeFi"]);
        assert_eq!(keywords_for_vote("ai", &hodler), vec!["Bitcoin", "DeFi", "HODLer"]);
        assert_eq!(keywords_for_vote("news", &hodler), vec!["Bitcoin", "DeFi"]);

        let custom = user("Bo", "whale", &[]);
        assert_eq!(keywords_for_vote("ai", &custom), vec!["whale"]);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(&user("  Ann ", "", &[])), "Ann");
        assert_eq!(display_name(&user("   ", "", &[])), "Anonymous");
    }

    #[test]
    fn test_user_vote_map_keys() {
        let map = user_vote_map(vec![vote(1, 1, None, "down")]);
        let entry = &map["news_42"];
        assert_eq!(entry.vote_type, "down");
        assert_eq!(entry.content_id, "42");
    }
}
