//! Ticker normalization applied to every source.

use crate::models::market::Ticker;
use crate::services::market_data::RawTicker;
use std::collections::HashSet;

/// Base-symbol fragments marking stablecoins, fiat pairs and leveraged tokens.
pub const EXCLUDED_BASE_FRAGMENTS: &[&str] = &[
    "USDC", "BUSD", "DAI", "TUSD", "USDP", "FDUSD", "EUR", "GBP", "UP", "DOWN", "BEAR", "BULL",
];

/// Longer bases are almost always leveraged or wrapped tokens.
pub const MAX_BASE_LEN: usize = 6;

const COIN_NAMES: &[(&str, &str)] = &[
    ("BTC", "Bitcoin"),
    ("ETH", "Ethereum"),
    ("BNB", "BNB"),
    ("XRP", "XRP"),
    ("SOL", "Solana"),
    ("DOGE", "Dogecoin"),
    ("ADA", "Cardano"),
    ("AVAX", "Avalanche"),
    ("SHIB", "Shiba Inu"),
    ("DOT", "Polkadot"),
    ("MATIC", "Polygon"),
    ("LTC", "Litecoin"),
    ("LINK", "Chainlink"),
    ("UNI", "Uniswap"),
    ("ATOM", "Cosmos"),
    ("TRX", "TRON"),
    ("ETC", "Ethereum Classic"),
    ("XLM", "Stellar"),
    ("BCH", "Bitcoin Cash"),
    ("FIL", "Filecoin"),
    ("NEAR", "NEAR Protocol"),
    ("APT", "Aptos"),
    ("ARB", "Arbitrum"),
    ("OP", "Optimism"),
    ("PEPE", "Pepe"),
    ("WIF", "dogwifhat"),
    ("BONK", "Bonk"),
    ("FLOKI", "Floki"),
    ("SUI", "Sui"),
    ("SEI", "Sei"),
    ("INJ", "Injective"),
    ("FET", "Fetch.ai"),
    ("RNDR", "Render"),
    ("IMX", "Immutable X"),
    ("STX", "Stacks"),
    ("GALA", "Gala"),
    ("SAND", "The Sandbox"),
    ("MANA", "Decentraland"),
    ("AXS", "Axie Infinity"),
    ("THETA", "Theta"),
    ("VET", "VeChain"),
    ("ALGO", "Algorand"),
    ("HBAR", "Hedera"),
];

pub fn display_name(base: &str, upstream_name: Option<&str>) -> String {
    COIN_NAMES
        .iter()
        .find(|(symbol, _)| *symbol == base)
        .map(|(_, name)| name.to_string())
        .or_else(|| upstream_name.map(str::to_string))
        .unwrap_or_else(|| base.to_string())
}

/// Quote-asset, exclusion-list and length rules.
pub fn is_eligible(raw: &RawTicker, quote_asset: &str) -> bool {
    let base = raw.base.to_uppercase();
    if base.is_empty() || base.len() > MAX_BASE_LEN {
        return false;
    }
    if !raw
        .quote
        .as_deref()
        .is_some_and(|quote| quote.eq_ignore_ascii_case(quote_asset))
    {
        return false;
    }
    !EXCLUDED_BASE_FRAGMENTS
        .iter()
        .any(|fragment| base.contains(fragment))
}

/// Filter and convert raw tickers. The first occurrence of a base wins, so
/// the output is keyed uniquely by symbol.
pub fn normalize_tickers(raw: &[RawTicker], quote_asset: &str, exchange_rate: f64) -> Vec<Ticker> {
    let mut seen = HashSet::new();
    raw.iter()
        .filter(|ticker| is_eligible(ticker, quote_asset))
        .filter(|ticker| seen.insert(ticker.base.to_uppercase()))
        .map(|ticker| {
            let base = ticker.base.to_uppercase();
            let symbol = base.to_lowercase();
            Ticker {
                id: symbol.clone(),
                symbol,
                name: display_name(&base, ticker.name.as_deref()),
                current_price_usd: ticker.price_usd,
                current_price_local: ticker.price_usd * exchange_rate,
                price_change_percentage_24h: ticker.change_percent_24h,
                volume_24h: ticker.volume,
                quote_volume: ticker.quote_volume,
            }
        })
        .collect()
}
