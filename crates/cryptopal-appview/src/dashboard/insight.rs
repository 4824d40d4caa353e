use chrono::{NaiveDate, Utc};
use cryptopal_db::UserPreferences;
use openrouter_client::ChatMessage;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use ts_rs::TS;

use super::{keys, Dashboard, DashboardError};
use crate::constants::{DEFAULT_ASSETS_LIST, INSIGHT_SYSTEM_PROMPT, INSIGHT_TTL};
use crate::sources::UpstreamError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct DailyInsight {
    pub insight: String,
    /// UTC day the insight was generated for, `YYYY-MM-DD`
    pub date: String,
    pub investor_type: String,
    pub assets: Vec<String>,
}

impl Dashboard {
    /// Today's AI insight for the user's investor type and categories
    pub async fn daily_insight(
        &self,
        preferences: &UserPreferences,
    ) -> Result<DailyInsight, DashboardError> {
        let today = Utc::now().date_naive();
        let key = keys::insight_key(today, preferences);
        let source = self.sources.insight.clone();
        let preferences = preferences.clone();

        let insight = self
            .resolve(&key, INSIGHT_TTL, || async move {
                let investor_type = keys::investor_type(&preferences).to_string();
                let assets_list = assets_list(&preferences.crypto_assets);
                let messages = [
                    ChatMessage::system(INSIGHT_SYSTEM_PROMPT),
                    ChatMessage::user(user_prompt(&investor_type, &assets_list)),
                ];

                let response = source.complete(&messages).await?;
                debug!(
                    choices = response
                        .get("choices")
                        .and_then(serde_json::Value::as_array)
                        .map_or(0, Vec::len),
                    "AI completion received"
                );

                Ok::<_, UpstreamError>(build_insight(
                    &response,
                    today,
                    investor_type,
                    preferences.crypto_assets,
                    &assets_list,
                ))
            })
            .await?;
        Ok(insight)
    }
}

fn assets_list(assets: &[String]) -> String {
    if assets.is_empty() {
        DEFAULT_ASSETS_LIST.to_string()
    } else {
        assets.join(", ")
    }
}

fn user_prompt(investor_type: &str, assets_list: &str) -> String {
    format!(
        "As a crypto investment advisor, provide a brief daily insight (2-3 sentences) for a {} investor interested in {}. Make it practical and actionable.",
        investor_type, assets_list
    )
}

/// Completion text from any of the response shapes providers return
pub fn extract_text(response: &Value) -> Option<String> {
    let choice_paths = [
        "/choices/0/message/content",
        "/choices/0/message/text",
        "/choices/0/text",
    ];
    let has_choices = response
        .get("choices")
        .and_then(Value::as_array)
        .is_some_and(|c| !c.is_empty());

    let text = if has_choices {
        choice_paths
            .iter()
            .filter_map(|path| response.pointer(path).and_then(Value::as_str))
            .find(|s| !s.is_empty())
    } else {
        ["message", "text"]
            .iter()
            .filter_map(|field| response.get(*field).and_then(Value::as_str))
            .find(|s| !s.is_empty())
    };

    text.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

fn build_insight(
    response: &Value,
    date: NaiveDate,
    investor_type: String,
    assets: Vec<String>,
    assets_list: &str,
) -> DailyInsight {
    let insight = extract_text(response).unwrap_or_else(|| {
        format!(
            "For {} investors interested in {}, consider diversifying your portfolio and staying informed about market trends. Always do your own research before making investment decisions.",
            investor_type, assets_list
        )
    });

    DailyInsight {
        insight,
        date: date.format("%Y-%m-%d").to_string(),
        investor_type,
        assets,
    }
}
