use crate::error::{AnalyticsError, Result};
use crate::utils::numeric::round_to;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

fn symbol_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\^?[A-Z0-9][A-Z0-9.\-=]{0,14}$").expect("static ticker pattern is valid")
    })
}

/// Trim and uppercase a symbol, rejecting anything that cannot be a ticker.
pub fn normalize_symbol(raw: &str) -> Result<String> {
    let symbol = raw.trim().to_uppercase();
    if symbol_pattern().is_match(&symbol) {
        Ok(symbol)
    } else {
        Err(AnalyticsError::InvalidTicker(raw.to_string()))
    }
}

/// Trim and uppercase each symbol, dropping blanks and repeats while
/// keeping the first occurrence. Symbols are not validated here.
pub fn dedup_symbols<'a>(symbols: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    symbols
        .into_iter()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

/// Split a comma separated ticker list. An empty list yields `defaults`.
pub fn parse_ticker_list(raw: &str, defaults: &[String]) -> Vec<String> {
    let tickers = dedup_symbols(raw.split(','));
    if tickers.is_empty() {
        dedup_symbols(defaults.iter().map(String::as_str))
    } else {
        tickers
    }
}

/// Descriptive record for a ticker as supplied by the metadata collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickerInfo {
    pub company_name: Option<String>,
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub previous_close: Option<f64>,
    pub day_high: Option<f64>,
    pub day_low: Option<f64>,
    pub volume: Option<u64>,
    pub pe_ratio: Option<f64>,
    pub dividend_yield: Option<f64>,
}

/// Ticker -> info, as stored in `ticker_info.json`.
pub type TickerInfoData = HashMap<String, TickerInfo>;

/// Per-ticker block attached to a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetadata {
    #[serde(rename = "company_name")]
    pub display_name: String,
    #[serde(rename = "current_price")]
    pub latest_known_price: Option<f64>,
    #[serde(rename = "market_cap")]
    pub market_capitalization: Option<f64>,
}

impl PerformanceMetadata {
    /// Merge collaborator metadata with what the price series already tells us.
    /// Missing fields fall back to the symbol and the last observed close.
    pub fn resolve(ticker: &str, info: Option<&TickerInfo>, last_close: Option<f64>) -> Self {
        let display_name = info
            .and_then(|i| i.company_name.clone())
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| ticker.to_string());

        let latest_known_price = info
            .and_then(|i| i.current_price)
            .filter(|p| p.is_finite() && *p > 0.0)
            .or(last_close)
            .map(|p| round_to(p, 2));

        Self {
            display_name,
            latest_known_price,
            market_capitalization: info.and_then(|i| i.market_cap),
        }
    }
}
