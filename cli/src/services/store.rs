use crate::{
    error::{AnalyticsError, Result},
    models::{Bar, DateRange, Series, TickerInfo},
};
use std::collections::{HashMap, HashSet};

/// Source of daily bars for a ticker.
///
/// Implementations return an empty `Series` or `AnalyticsError::EmptyResult`
/// when nothing falls inside the range; callers treat both the same way.
#[async_trait::async_trait]
pub trait SeriesStore: Send + Sync {
    async fn fetch_series(&self, ticker: &str, range: &DateRange) -> Result<Series>;
}

/// Source of descriptive ticker metadata, independent of price data.
#[async_trait::async_trait]
pub trait MetadataStore: Send + Sync {
    async fn fetch_metadata(&self, ticker: &str) -> Result<TickerInfo>;
}

/// Map-backed store for both bars and metadata.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    bars: HashMap<String, Vec<Bar>>,
    info: HashMap<String, TickerInfo>,
    failing: HashSet<String>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<Bar>) -> Self {
        self.insert_bars(ticker, bars);
        self
    }

    pub fn with_info(mut self, ticker: &str, info: TickerInfo) -> Self {
        self.insert_info(ticker, info);
        self
    }

    /// Every fetch for `ticker` fails with `AnalyticsError::Fetch`.
    pub fn with_failing(mut self, ticker: &str) -> Self {
        self.failing.insert(ticker.to_string());
        self
    }

    pub fn insert_bars(&mut self, ticker: &str, bars: Vec<Bar>) {
        self.bars.entry(ticker.to_string()).or_default().extend(bars);
    }

    pub fn insert_info(&mut self, ticker: &str, info: TickerInfo) {
        self.info.insert(ticker.to_string(), info);
    }
}

#[async_trait::async_trait]
impl SeriesStore for InMemoryStore {
    async fn fetch_series(&self, ticker: &str, range: &DateRange) -> Result<Series> {
        if self.failing.contains(ticker) {
            return Err(AnalyticsError::fetch(ticker, "store unavailable"));
        }

        let bars: Vec<Bar> = self
            .bars
            .get(ticker)
            .map(|bars| {
                bars.iter()
                    .filter(|bar| range.contains(bar.date))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        Series::new(ticker, bars)
    }
}

#[async_trait::async_trait]
impl MetadataStore for InMemoryStore {
    async fn fetch_metadata(&self, ticker: &str) -> Result<TickerInfo> {
        if self.failing.contains(ticker) {
            return Err(AnalyticsError::fetch(ticker, "store unavailable"));
        }
        self.info
            .get(ticker)
            .cloned()
            .ok_or_else(|| AnalyticsError::empty(ticker))
    }
}
