use crate::error::{AnalyticsError, Result};
use crate::utils::numeric::round_to;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day's OHLCV for a ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    #[serde(with = "crate::utils::date::iso_date")]
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Copy with prices rounded to cents, as emitted at the boundary.
    pub fn rounded(&self) -> Self {
        Self {
            date: self.date,
            open: round_to(self.open, 2),
            high: round_to(self.high, 2),
            low: round_to(self.low, 2),
            close: round_to(self.close, 2),
            volume: self.volume,
        }
    }
}

/// Daily bars for one ticker, strictly increasing by date.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    ticker: String,
    bars: Vec<Bar>,
}

impl Series {
    /// Sort the bars by date and reject duplicate days.
    pub fn new(ticker: impl Into<String>, mut bars: Vec<Bar>) -> Result<Self> {
        let ticker = ticker.into();
        bars.sort_by_key(|b| b.date);

        if let Some(pair) = bars.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(AnalyticsError::MalformedSeries {
                detail: format!("duplicate bar on {}", pair[0].date.format("%Y-%m-%d")),
                ticker,
            });
        }

        Ok(Self { ticker, bars })
    }

    pub fn empty(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            bars: Vec::new(),
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Keep only the bars whose date satisfies the predicate.
    pub fn retain_dates<F>(mut self, mut keep: F) -> Self
    where
        F: FnMut(NaiveDate) -> bool,
    {
        self.bars.retain(|b| keep(b.date));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_series_is_sorted_on_construction() {
        let series = Series::new(
            "AAPL",
            vec![
                Bar::new(day(3), 1.0, 1.0, 1.0, 3.0, 30),
                Bar::new(day(1), 1.0, 1.0, 1.0, 1.0, 10),
                Bar::new(day(2), 1.0, 1.0, 1.0, 2.0, 20),
            ],
        )
        .unwrap();

        assert_eq!(series.closes(), vec![1.0, 2.0, 3.0]);
        assert_eq!(series.first_date(), Some(day(1)));
        assert_eq!(series.last_date(), Some(day(3)));
        assert_eq!(series.last_close(), Some(3.0));
    }

    #[test]
    fn test_duplicate_dates_are_rejected() {
        let result = Series::new(
            "AAPL",
            vec![
                Bar::new(day(2), 1.0, 1.0, 1.0, 1.0, 1),
                Bar::new(day(2), 1.0, 1.0, 1.0, 2.0, 1),
            ],
        );
        assert!(matches!(result, Err(AnalyticsError::MalformedSeries { .. })));
    }

    #[test]
    fn test_bar_serializes_iso_date_and_rounds() {
        let bar = Bar::new(day(5), 10.004, 11.126, 9.991, 10.555, 1200).rounded();
        let json = serde_json::to_value(&bar).unwrap();
        assert_eq!(json["date"], "2024-01-05");
        assert_eq!(json["high"], 11.13);
        assert_eq!(json["volume"], 1200);
    }
}
