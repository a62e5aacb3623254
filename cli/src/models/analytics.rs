use crate::models::ticker::PerformanceMetadata;
use crate::utils::date::format_date;
use chrono::NaiveDate;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Values a single ticker contributes to one aligned date.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerColumns {
    pub close: f64,
    pub volume: u64,
    pub relative_index: Option<f64>,
}

/// One calendar date across every ticker that traded on it.
///
/// Serialized flat, the way the charting front end consumes it:
/// `{"date": "2024-01-02", "AAPL_close": 185.64, "AAPL_volume": 82488700, "AAPL_relative": 100.0}`.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRow {
    pub date: NaiveDate,
    pub values: BTreeMap<String, TickerColumns>,
}

impl AlignedRow {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            values: BTreeMap::new(),
        }
    }

    pub fn get(&self, ticker: &str) -> Option<&TickerColumns> {
        self.values.get(ticker)
    }

    pub fn close(&self, ticker: &str) -> Option<f64> {
        self.values.get(ticker).map(|c| c.close)
    }

    pub fn relative_index(&self, ticker: &str) -> Option<f64> {
        self.values.get(ticker).and_then(|c| c.relative_index)
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.values.contains_key(ticker)
    }
}

impl Serialize for AlignedRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = 1 + self
            .values
            .values()
            .map(|c| 2 + usize::from(c.relative_index.is_some()))
            .sum::<usize>();

        let mut map = serializer.serialize_map(Some(fields))?;
        map.serialize_entry("date", &format_date(self.date))?;
        for (ticker, columns) in &self.values {
            map.serialize_entry(&format!("{}_close", ticker), &columns.close)?;
            map.serialize_entry(&format!("{}_volume", ticker), &columns.volume)?;
            if let Some(relative) = columns.relative_index {
                map.serialize_entry(&format!("{}_relative", ticker), &relative)?;
            }
        }
        map.end()
    }
}

/// How a single requested ticker fared during a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerStatus {
    pub ticker: String,
    pub status: FetchStatus,
    pub bars: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    Ok,
    Empty,
    Error,
}

/// Overall shape of a comparison result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareStatus {
    /// Every requested ticker produced data.
    Complete,
    /// Some tickers produced data, some did not.
    Partial,
    /// No ticker produced data.
    NoData,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompareResult {
    pub tickers: Vec<String>,
    #[serde(rename = "data")]
    pub rows: Vec<AlignedRow>,
    #[serde(rename = "stock_info")]
    pub metadata: BTreeMap<String, PerformanceMetadata>,
    #[serde(rename = "ticker_status")]
    pub statuses: Vec<TickerStatus>,
    pub status: CompareStatus,
}

impl CompareResult {
    pub fn loaded_tickers(&self) -> impl Iterator<Item = &str> {
        self.statuses
            .iter()
            .filter(|s| s.status == FetchStatus::Ok)
            .map(|s| s.ticker.as_str())
    }
}

/// Fitted and observed values for one historical trading day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    #[serde(with = "crate::utils::date::iso_date")]
    pub date: NaiveDate,
    #[serde(rename = "actual")]
    pub actual_close: f64,
    #[serde(rename = "linear_pred")]
    pub linear_fit: f64,
    #[serde(rename = "poly_pred")]
    pub poly_fit: f64,
    #[serde(rename = "daily_change")]
    pub daily_change_pct: f64,
    #[serde(rename = "cumulative_change")]
    pub cumulative_change_pct: f64,
    pub volume: u64,
}

/// Extrapolated values for a future calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    #[serde(with = "crate::utils::date::iso_date")]
    pub date: NaiveDate,
    #[serde(rename = "linear_pred")]
    pub linear_fit: f64,
    #[serde(rename = "poly_pred")]
    pub poly_fit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelStats {
    #[serde(rename = "linear_r2")]
    pub linear_r_squared: f64,
    pub data_points: usize,
    #[serde(rename = "prediction_days")]
    pub forecast_horizon_days: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub ticker: String,
    #[serde(rename = "historical_data")]
    pub historical: Vec<TrendPoint>,
    #[serde(rename = "future_predictions")]
    pub forecast: Vec<ForecastPoint>,
    #[serde(rename = "model_stats")]
    pub stats: ModelStats,
}
