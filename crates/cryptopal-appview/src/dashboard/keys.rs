//! Cache key derivation.
//!
//! Keys depend only on the effective inputs: category lists are trimmed,
//! sorted and deduplicated so the same selection in any order shares a slot.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use cryptopal_db::UserPreferences;

use crate::constants::{
    DEFAULT_COINS, DEFAULT_HISTORY_DAYS, DEFAULT_INVESTOR_TYPE, DEFAULT_NEWS_CURRENCIES,
    FALLBACK_MEME_KEYWORD, NEWS_CURRENCIES, PRICE_COINS, VALID_HISTORY_DAYS,
};

/// Sorted, deduplicated, non-empty categories
pub fn normalized_categories(categories: &[String]) -> Vec<String> {
    categories
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn lookup<'a>(map: &[(&str, &'a str)], category: &str) -> Option<&'a str> {
    map.iter()
        .find(|(name, _)| *name == category)
        .map(|(_, value)| *value)
}

/// Expand categories through a category map, keeping first-seen order without repeats
fn expand(map: &[(&str, &str)], categories: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    categories
        .iter()
        .filter_map(|c| lookup(map, c.trim()))
        .flat_map(|ids| ids.split(','))
        .filter(|id| seen.insert(*id))
        .map(str::to_string)
        .collect()
}

pub fn news_key(preferences: &UserPreferences) -> String {
    let categories = normalized_categories(&preferences.crypto_assets);
    if categories.is_empty() {
        "news_all".to_string()
    } else {
        format!("news_{}", categories.join("_"))
    }
}

/// CryptoPanic currency codes for the user's categories
pub fn news_currencies(preferences: &UserPreferences) -> String {
    let codes = expand(NEWS_CURRENCIES, &normalized_categories(&preferences.crypto_assets));
    if codes.is_empty() {
        DEFAULT_NEWS_CURRENCIES.to_string()
    } else {
        codes.join(",")
    }
}

/// CoinGecko ids for the user's categories, sorted, always at least two
pub fn coin_ids(preferences: &UserPreferences) -> Vec<String> {
    let mut ids = expand(PRICE_COINS, &preferences.crypto_assets);
    if ids.is_empty() {
        ids = DEFAULT_COINS.iter().map(|id| id.to_string()).collect();
    }

    if ids.len() == 1 {
        let filler = DEFAULT_COINS
            .iter()
            .find(|id| !ids.iter().any(|existing| existing.as_str() == **id));
        if let Some(filler) = filler {
            ids.push(filler.to_string());
        }
    }

    ids.sort();
    ids
}

pub fn prices_key(coin_ids: &[String]) -> String {
    format!("prices_{}", coin_ids.join("_"))
}

/// Accepted lookback window, defaulting anything else
pub fn history_days(days: Option<&str>) -> &'static str {
    days.and_then(|d| VALID_HISTORY_DAYS.iter().find(|valid| **valid == d.trim()))
        .copied()
        .unwrap_or(DEFAULT_HISTORY_DAYS)
}

pub fn price_history_key(coin_id: &str, days: &str) -> String {
    format!("price_history_{}_{}", coin_id, days)
}

pub fn investor_type(preferences: &UserPreferences) -> &str {
    let investor_type = preferences.investor_type.trim();
    if investor_type.is_empty() {
        DEFAULT_INVESTOR_TYPE
    } else {
        investor_type
    }
}

/// One insight per day, investor type and category set
pub fn insight_key(date: NaiveDate, preferences: &UserPreferences) -> String {
    let categories = normalized_categories(&preferences.crypto_assets);
    let assets = if categories.is_empty() {
        "default".to_string()
    } else {
        categories.join("_")
    };
    format!(
        "ai_insight_{}_{}_{}",
        date.format("%Y-%m-%d"),
        investor_type(preferences),
        assets
    )
}

/// Today's meme keyword: the user's categories take turns, one per day of the year
pub fn meme_keyword(preferences: &UserPreferences, date: NaiveDate) -> String {
    let categories = normalized_categories(&preferences.crypto_assets);
    if categories.is_empty() {
        return FALLBACK_MEME_KEYWORD.to_string();
    }
    let index = date.ordinal0() as usize % categories.len();
    categories[index].clone()
}

pub fn normalize_keyword(keyword: &str) -> String {
    let normalized = keyword.trim().to_lowercase();
    if normalized.is_empty() {
        FALLBACK_MEME_KEYWORD.to_string()
    } else {
        normalized
    }
}

pub fn meme_key(normalized_keyword: &str) -> String {
    let joined = normalized_keyword.split_whitespace().collect::<Vec<_>>().join("_");
    format!("meme_{}", joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefs(assets: &[&str]) -> UserPreferences {
        UserPreferences {
            crypto_assets: assets.iter().map(|a| a.to_string()).collect(),
            ..UserPreferences::default()
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_equivalent_selections_share_keys() {
        let a = prefs(&["Ethereum", "Bitcoin", "DeFi"]);
        let b = prefs(&["DeFi", "Bitcoin", "Ethereum", "Bitcoin"]);

        assert_eq!(news_key(&a), news_key(&b));
        assert_eq!(news_key(&a), "news_Bitcoin_DeFi_Ethereum");
        assert_eq!(prices_key(&coin_ids(&a)), prices_key(&coin_ids(&b)));
        assert_eq!(insight_key(date(2025, 3, 1), &a), insight_key(date(2025, 3, 1), &b));
    }

    #[test]
    fn test_news_defaults() {
        let empty = prefs(&[]);
        assert_eq!(news_key(&empty), "news_all");
        assert_eq!(news_currencies(&empty), "BTC,ETH");
        assert_eq!(news_currencies(&prefs(&["Unknown"])), "BTC,ETH");
    }

    #[test]
    fn test_news_currencies_dedupe() {
        assert_eq!(news_currencies(&prefs(&["NFTs", "Ethereum"])), "ETH");
        assert_eq!(
            news_currencies(&prefs(&["Bitcoin", "Meme Coins"])),
            "BTC,DOGE,SHIB"
        );
    }

    #[test]
    fn test_coin_ids_default_and_padding() {
        assert_eq!(coin_ids(&prefs(&[])), vec!["bitcoin", "ethereum"]);
        assert_eq!(coin_ids(&prefs(&["Bitcoin"])), vec!["bitcoin", "ethereum"]);
        assert_eq!(coin_ids(&prefs(&["NFTs"])), vec!["bitcoin", "ethereum"]);
        assert_eq!(
            coin_ids(&prefs(&["Meme Coins"])),
            vec!["dogecoin", "shiba-inu"]
        );
        assert_eq!(prices_key(&coin_ids(&prefs(&[]))), "prices_bitcoin_ethereum");
    }

    #[test]
    fn test_history_days() {
        assert_eq!(history_days(Some("30")), "30");
        assert_eq!(history_days(Some("14")), "7");
        assert_eq!(history_days(None), "7");
        assert_eq!(price_history_key("bitcoin", "365"), "price_history_bitcoin_365");
    }

    #[test]
    fn test_insight_key() {
        let mut p = prefs(&[]);
        assert_eq!(insight_key(date(2025, 1, 2), &p), "ai_insight_2025-01-02_general_default");

        p.investor_type = "hodler".into();
        p.crypto_assets = vec!["Layer 2".into()];
        assert_eq!(insight_key(date(2025, 1, 2), &p), "ai_insight_2025-01-02_hodler_Layer 2");
    }

    #[test]
    fn test_meme_keyword_rotates_daily() {
        let p = prefs(&["DeFi", "Bitcoin"]);
        // Jan 1 is ordinal 0, Jan 2 ordinal 1
        assert_eq!(meme_keyword(&p, date(2025, 1, 1)), "Bitcoin");
        assert_eq!(meme_keyword(&p, date(2025, 1, 2)), "DeFi");
        assert_eq!(meme_keyword(&prefs(&[]), date(2025, 1, 2)), "crypto");
    }

    #[test]
    fn test_meme_key_normalization() {
        assert_eq!(normalize_keyword("  Meme Coins "), "meme coins");
        assert_eq!(normalize_keyword("   "), "crypto");
        assert_eq!(meme_key(&normalize_keyword("Meme Coins")), "meme_meme_coins");
    }
}
