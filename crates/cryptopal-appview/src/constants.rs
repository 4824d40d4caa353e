use std::time::Duration;

// --- Category maps ---

/// Dashboard asset categories mapped to CryptoPanic currency codes.
pub const NEWS_CURRENCIES: &[(&str, &str)] = &[
    ("Bitcoin", "BTC"),
    ("Ethereum", "ETH"),
    ("Altcoins", "ADA,DOT,SOL,AVAX,ALGO"),
    ("DeFi", "UNI,AAVE,LINK,COMP,MKR"),
    ("NFTs", "ETH"),
    ("Stablecoins", "USDT,USDC,DAI,BUSD"),
    ("Layer 2", "MATIC,ARB,OP"),
    ("Meme Coins", "DOGE,SHIB"),
];

/// Dashboard asset categories mapped to CoinGecko coin ids.
pub const PRICE_COINS: &[(&str, &str)] = &[
    ("Bitcoin", "bitcoin"),
    ("Ethereum", "ethereum"),
    ("Altcoins", "cardano,polkadot,solana,avalanche-2,algorand"),
    ("DeFi", "uniswap,aave,chainlink,compound-governance-token,maker"),
    ("NFTs", "ethereum"),
    ("Stablecoins", "tether,usd-coin,dai,binance-usd"),
    ("Layer 2", "polygon,arbitrum,optimism"),
    ("Meme Coins", "dogecoin,shiba-inu"),
];

// --- News ---

/// Currencies requested when the user's categories map to nothing.
pub const DEFAULT_NEWS_CURRENCIES: &str = "BTC,ETH";

/// Maximum number of news items returned.
pub const NEWS_LIMIT: usize = 10;

// --- Prices ---

/// Coins shown when nothing else is selected, and the last-resort price key.
pub const DEFAULT_COINS: &[&str] = &["bitcoin", "ethereum"];

/// Lookback windows (days) accepted by the history endpoint.
pub const VALID_HISTORY_DAYS: &[&str] = &["1", "7", "30", "365"];

pub const DEFAULT_HISTORY_DAYS: &str = "7";

// --- AI insight ---

pub const DEFAULT_INVESTOR_TYPE: &str = "general";

/// Asset phrase used in prompts when the user picked no categories.
pub const DEFAULT_ASSETS_LIST: &str = "Bitcoin and Ethereum";

pub const INSIGHT_SYSTEM_PROMPT: &str =
    "You are a helpful crypto investment advisor. Provide concise, practical insights in 2-3 sentences.";

// --- Memes ---

/// Keyword used when the user has no categories, and retried when a keyword finds nothing.
pub const FALLBACK_MEME_KEYWORD: &str = "crypto";

pub const MEMES_PER_REQUEST: u32 = 3;

// --- Votes ---

pub const CONTENT_TYPES: &[&str] = &["news", "price", "ai", "meme"];

pub const VOTE_TYPES: &[&str] = &["up", "down"];

/// Voter display names returned per direction.
pub const MAX_VOTER_NAMES: usize = 5;

/// Investor types mapped to the label stored as a vote keyword.
pub const INVESTOR_LABELS: &[(&str, &str)] = &[
    ("hodler", "HODLer"),
    ("day-trader", "Day Trader"),
    ("nft-collector", "NFT Collector"),
];

pub const ANONYMOUS_VOTER: &str = "Anonymous";

// --- Cache lifetimes ---

/// How long one domain's data stays fresh in each cache tier.
#[derive(Debug, Clone, Copy)]
pub struct CacheTtl {
    pub persistent_hours: i64,
    pub memory: Duration,
}

const HOUR: Duration = Duration::from_secs(60 * 60);

pub const NEWS_TTL: CacheTtl = CacheTtl {
    persistent_hours: 1,
    memory: HOUR,
};

pub const PRICES_TTL: CacheTtl = CacheTtl {
    persistent_hours: 1,
    memory: HOUR,
};

pub const PRICE_HISTORY_TTL: CacheTtl = CacheTtl {
    persistent_hours: 1,
    memory: HOUR,
};

pub const INSIGHT_TTL: CacheTtl = CacheTtl {
    persistent_hours: 24,
    memory: Duration::from_secs(24 * 60 * 60),
};

pub const MEMES_TTL: CacheTtl = CacheTtl {
    persistent_hours: 24,
    memory: Duration::from_secs(24 * 60 * 60),
};
