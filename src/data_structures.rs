use crate::config::AppConfig;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tickertrend::{
    api::StockAnalyzer,
    data::{Bar, CompareResult, TickerInfo},
};

// --- Shared State ---

#[derive(Clone)]
pub struct AppState {
    pub analyzer: StockAnalyzer,
    pub config: Arc<AppConfig>,
    pub market_tz: Tz,
}

// --- Query Parameters ---

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompareQuery {
    pub tickers: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

// --- Response Bodies ---

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub ticker: String,
    pub data: Vec<Bar>,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub ticker: String,
    #[serde(flatten)]
    pub info: TickerInfo,
}

#[derive(Debug, Serialize)]
pub struct CompareResponse {
    #[serde(flatten)]
    pub result: CompareResult,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
