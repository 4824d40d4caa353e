use chrono::{DateTime, SecondsFormat, Utc};
use cryptopal_db::UserPreferences;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, warn};
use ts_rs::TS;

use super::{keys, Dashboard, DashboardError};
use crate::constants::{DEFAULT_COINS, PRICES_TTL, PRICE_HISTORY_TTL};
use crate::sources::UpstreamError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PriceEntry {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub change24h: f64,
    pub market_cap: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PriceSnapshot {
    pub prices: Vec<PriceEntry>,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PricePoint {
    /// Milliseconds since the epoch
    pub timestamp: i64,
    pub date: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PriceHistory {
    pub coin_id: String,
    pub days: String,
    pub prices: Vec<PricePoint>,
    /// `[timestamp, value]` pairs as returned upstream
    pub market_caps: Value,
    pub total_volumes: Value,
}

impl Dashboard {
    /// Spot prices for the user's coins.
    ///
    /// Falls back to bitcoin/ethereum when the selection cannot be served, and
    /// to zeroed placeholders when even that fails, so this never errors.
    pub async fn prices(&self, preferences: &UserPreferences) -> PriceSnapshot {
        let coin_ids = keys::coin_ids(preferences);
        let key = keys::prices_key(&coin_ids);

        if let Some(hit) = self.remembered(&key).await {
            return hit;
        }

        let mut snapshot = self.cached_prices(&key, coin_ids).await;

        if snapshot.is_none() {
            let default_ids: Vec<String> = DEFAULT_COINS.iter().map(|id| id.to_string()).collect();
            let default_key = keys::prices_key(&default_ids);
            if default_key != key {
                warn!(key = %key, "Primary price fetch failed, trying default coins");
                snapshot = self.cached_prices(&default_key, default_ids).await;
            }
        }

        let snapshot = snapshot.unwrap_or_else(|| {
            error!(key = %key, "All price fetches failed, serving placeholder prices");
            fallback_prices(Utc::now())
        });

        self.remember(&key, &snapshot, PRICES_TTL).await;
        snapshot
    }

    async fn cached_prices(&self, key: &str, coin_ids: Vec<String>) -> Option<PriceSnapshot> {
        let source = self.sources.prices.clone();
        let result = self
            .persistent(key, PRICES_TTL, || async move {
                let data = source.simple_price(&coin_ids).await?;
                format_prices(&data, Utc::now()).ok_or_else(|| {
                    UpstreamError::new("CoinGecko", None, "No valid price data after formatting")
                })
            })
            .await;

        match result {
            Ok(snapshot) if !snapshot.prices.is_empty() => Some(snapshot),
            Ok(_) => None,
            Err(e) => {
                warn!(key = %key, error = %DashboardError::from(e), "Price fetch failed");
                None
            }
        }
    }

    /// Market chart for one coin. Anything short of data is "not found".
    pub async fn price_history(
        &self,
        coin_id: &str,
        days: Option<&str>,
    ) -> Result<PriceHistory, DashboardError> {
        let coin_id = coin_id.trim();
        if coin_id.is_empty() {
            return Err(DashboardError::InvalidInput("Coin ID is required".into()));
        }
        let days = keys::history_days(days);
        let key = keys::price_history_key(coin_id, days);
        let source = self.sources.prices.clone();
        let owned_id = coin_id.to_string();

        let result = self
            .resolve(&key, PRICE_HISTORY_TTL, || async move {
                let data = source.market_chart(&owned_id, days).await?;
                let history = format_history(&owned_id, days, &data);
                debug!(
                    coin_id = %owned_id,
                    days = %days,
                    points = history.prices.len(),
                    "Fetched price history"
                );
                Ok::<_, UpstreamError>(history)
            })
            .await;

        match result {
            Ok(history) => Ok(history),
            Err(cryptopal_cache::CacheError::Fetch(e)) => {
                warn!(coin_id = %coin_id, error = %e, "Price history unavailable");
                Err(DashboardError::NotFound(format!(
                    "Historical price data not available for {}",
                    coin_id
                )))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Normalize a `/simple/price` response. `None` when no coin carries a USD price.
pub fn format_prices(data: &Value, now: DateTime<Utc>) -> Option<PriceSnapshot> {
    let coins = data.as_object().filter(|o| !o.is_empty())?;

    let prices: Vec<PriceEntry> = coins
        .iter()
        .filter_map(|(id, quote)| {
            let price = quote.get("usd")?.as_f64()?;
            Some(PriceEntry {
                id: id.clone(),
                symbol: id.to_uppercase(),
                name: display_name(id),
                price,
                change24h: quote
                    .get("usd_24h_change")
                    .and_then(Value::as_f64)
                    .unwrap_or(0.0),
                market_cap: quote
                    .get("usd_market_cap")
                    .and_then(Value::as_f64)
                    .unwrap_or(0.0),
            })
        })
        .collect();

    if prices.is_empty() {
        warn!("No valid price data after formatting");
        return None;
    }

    Some(PriceSnapshot {
        prices,
        timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// `shiba-inu` -> `Shiba inu`
fn display_name(id: &str) -> String {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>().replace('-', " "),
        None => String::new(),
    }
}

/// Zeroed bitcoin/ethereum placeholders
pub fn fallback_prices(now: DateTime<Utc>) -> PriceSnapshot {
    let placeholder = |id: &str, symbol: &str, name: &str| PriceEntry {
        id: id.to_string(),
        symbol: symbol.to_string(),
        name: name.to_string(),
        price: 0.0,
        change24h: 0.0,
        market_cap: 0.0,
    };

    PriceSnapshot {
        prices: vec![
            placeholder("bitcoin", "BTC", "Bitcoin"),
            placeholder("ethereum", "ETH", "Ethereum"),
        ],
        timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

pub fn format_history(coin_id: &str, days: &str, data: &Value) -> PriceHistory {
    let prices = data
        .get("prices")
        .and_then(Value::as_array)
        .map(|points| points.iter().filter_map(price_point).collect())
        .unwrap_or_default();

    let series = |field: &str| {
        data.get(field)
            .filter(|v| v.is_array())
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()))
    };

    PriceHistory {
        coin_id: coin_id.to_string(),
        days: days.to_string(),
        prices,
        market_caps: series("market_caps"),
        total_volumes: series("total_volumes"),
    }
}

fn price_point(pair: &Value) -> Option<PricePoint> {
    let pair = pair.as_array()?;
    let timestamp = pair.first()?.as_f64()? as i64;
    let price = pair.get(1)?.as_f64()?;
    let date = DateTime::from_timestamp_millis(timestamp)?;
    Some(PricePoint {
        timestamp,
        date: date.to_rfc3339_opts(SecondsFormat::Millis, true),
        price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::testing::{dashboard, FakeUpstream};
    use serde_json::json;

    fn prefs(assets: &[&str]) -> UserPreferences {
        UserPreferences {
            crypto_assets: assets.iter().map(|a| a.to_string()).collect(),
            ..UserPreferences::default()
        }
    }

    #[test]
    fn test_entries_missing_usd_mean_no_data() {
        let data = json!({
            "bitcoin": {"eur": 1.0},
            "ethereum": {"usd_market_cap": 5.0}
        });
        assert!(format_prices(&data, Utc::now()).is_none());
        assert!(format_prices(&json!({}), Utc::now()).is_none());
    }

    #[test]
    fn test_format_prices_defaults() {
        let data = json!({
            "shiba-inu": {"usd": 0.00001, "usd_24h_change": -2.5},
            "dogecoin": {"usd": 0.1}
        });
        let snapshot = format_prices(&data, Utc::now()).unwrap();
        let shib = snapshot.prices.iter().find(|p| p.id == "shiba-inu").unwrap();
        let doge = snapshot.prices.iter().find(|p| p.id == "dogecoin").unwrap();

        assert_eq!(shib.symbol, "SHIBA-INU");
        assert_eq!(shib.name, "Shiba inu");
        assert_eq!(shib.change24h, -2.5);
        assert_eq!(doge.market_cap, 0.0);
    }

    #[tokio::test]
    async fn test_unusable_prices_fall_back_to_zeroed_pair() {
        let (dashboard, fake, _) = dashboard(FakeUpstream {
            prices: Some(json!({"solana": {"eur": 1.0}})),
            ..FakeUpstream::default()
        });

        let snapshot = dashboard.prices(&prefs(&["Altcoins"])).await;

        let ids: Vec<&str> = snapshot.prices.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["bitcoin", "ethereum"]);
        assert!(snapshot.prices.iter().all(|p| p.price == 0.0 && p.market_cap == 0.0));
        // Primary key, then the default bitcoin/ethereum key
        assert_eq!(fake.calls(), 2);
    }

    #[tokio::test]
    async fn test_prices_served_from_memory_on_repeat() {
        let (dashboard, fake, _) = dashboard(FakeUpstream {
            prices: Some(json!({
                "bitcoin": {"usd": 60000.0, "usd_24h_change": 1.5, "usd_market_cap": 1.2e12},
                "ethereum": {"usd": 3000.0}
            })),
            ..FakeUpstream::default()
        });

        let first = dashboard.prices(&prefs(&["Bitcoin"])).await;
        let second = dashboard.prices(&prefs(&["Bitcoin"])).await;

        assert_eq!(first, second);
        assert_eq!(first.prices.len(), 2);
        assert_eq!(fake.calls(), 1);
    }

    #[tokio::test]
    async fn test_history_failure_is_not_found() {
        let (dashboard, _, _) = dashboard(FakeUpstream::default());

        let err = dashboard.price_history("nope", Some("30")).await.unwrap_err();

        assert_eq!(err.status_hint(), Some(404));
        assert_eq!(err.to_string(), "Historical price data not available for nope");
    }

    #[tokio::test]
    async fn test_history_requires_coin_id() {
        let (dashboard, fake, _) = dashboard(FakeUpstream::default());

        let err = dashboard.price_history("  ", None).await.unwrap_err();

        assert_eq!(err.status_hint(), Some(400));
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn test_history_formatting() {
        let (dashboard, _, _) = dashboard(FakeUpstream {
            chart: Some(json!({
                "prices": [[1700000000000_i64, 35000.5], [1700003600000_i64, 35100.0]],
                "market_caps": [[1700000000000_i64, 6.8e11]]
            })),
            ..FakeUpstream::default()
        });

        let history = dashboard.price_history("bitcoin", Some("90")).await.unwrap();

        assert_eq!(history.days, "7");
        assert_eq!(history.prices.len(), 2);
        assert_eq!(history.prices[0].date, "2023-11-14T22:13:20.000Z");
        assert_eq!(history.market_caps.as_array().map(Vec::len), Some(1));
        assert_eq!(history.total_volumes, json!([]));
    }
}
