use crate::{
    error::AnalyticsError,
    models::{normalize_symbol, DateRange, Series},
    services::store::SeriesStore,
};
use futures::future::join_all;
use std::time::Duration;
use tracing::{debug, warn};

/// What happened to one ticker of a multi-ticker fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum TickerOutcome {
    Loaded(Series),
    Empty { ticker: String },
    Failed { ticker: String, reason: String },
}

impl TickerOutcome {
    pub fn ticker(&self) -> &str {
        match self {
            TickerOutcome::Loaded(series) => series.ticker(),
            TickerOutcome::Empty { ticker } | TickerOutcome::Failed { ticker, .. } => ticker,
        }
    }

    pub fn series(&self) -> Option<&Series> {
        match self {
            TickerOutcome::Loaded(series) => Some(series),
            _ => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, TickerOutcome::Loaded(_))
    }
}

/// Fetch one ticker, bounded by `timeout`, and classify the result.
/// A symbol that cannot be a ticker fails without reaching the store.
pub async fn fetch_one(
    store: &dyn SeriesStore,
    ticker: &str,
    range: &DateRange,
    timeout: Duration,
) -> TickerOutcome {
    if let Err(e) = normalize_symbol(ticker) {
        warn!(ticker, reason = %e, "Invalid symbol, skipping ticker");
        return TickerOutcome::Failed {
            ticker: ticker.to_string(),
            reason: e.to_string(),
        };
    }

    let outcome = match tokio::time::timeout(timeout, store.fetch_series(ticker, range)).await {
        Ok(Ok(series)) if series.is_empty() => TickerOutcome::Empty {
            ticker: ticker.to_string(),
        },
        Ok(Ok(series)) => TickerOutcome::Loaded(series),
        Ok(Err(AnalyticsError::EmptyResult { .. })) => TickerOutcome::Empty {
            ticker: ticker.to_string(),
        },
        Ok(Err(e)) => TickerOutcome::Failed {
            ticker: ticker.to_string(),
            reason: e.to_string(),
        },
        Err(_) => TickerOutcome::Failed {
            ticker: ticker.to_string(),
            reason: format!("fetch timed out after {}s", timeout.as_secs_f64()),
        },
    };

    match &outcome {
        TickerOutcome::Loaded(series) => {
            debug!(ticker, bars = series.len(), "Fetched series");
        }
        TickerOutcome::Empty { .. } => {
            warn!(ticker, range = %range, "No data in range, skipping ticker");
        }
        TickerOutcome::Failed { reason, .. } => {
            warn!(ticker, reason = %reason, "Fetch failed, skipping ticker");
        }
    }

    outcome
}

/// Fetch every ticker concurrently. Outcomes come back in request order and
/// one ticker failing never cancels the others.
pub async fn fetch_all(
    store: &dyn SeriesStore,
    tickers: &[String],
    range: &DateRange,
    timeout: Duration,
) -> Vec<TickerOutcome> {
    let tasks = tickers
        .iter()
        .map(|ticker| fetch_one(store, ticker, range, timeout));
    join_all(tasks).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::models::Bar;
    use crate::services::store::InMemoryStore;
    use crate::utils::date::parse_date;

    fn bars(closes: &[f64]) -> Vec<Bar> {
        let start = parse_date("2024-01-02").unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::new(start + chrono::Duration::days(i as i64), c, c, c, c, 1))
            .collect()
    }

    fn range() -> DateRange {
        DateRange::parse("2024-01-01", "2024-01-31").unwrap()
    }

    fn tickers(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    #[tokio::test]
    async fn test_outcomes_follow_request_order() {
        let store = InMemoryStore::new()
            .with_bars("AAA", bars(&[1.0, 2.0]))
            .with_bars("CCC", bars(&[3.0]))
            .with_failing("BBB");

        let outcomes = fetch_all(
            &store,
            &tickers(&["CCC", "BBB", "AAA", "ZZZ"]),
            &range(),
            Duration::from_secs(1),
        )
        .await;

        let order: Vec<&str> = outcomes.iter().map(TickerOutcome::ticker).collect();
        assert_eq!(order, vec!["CCC", "BBB", "AAA", "ZZZ"]);
        assert!(outcomes[0].is_loaded());
        assert!(matches!(outcomes[1], TickerOutcome::Failed { .. }));
        assert_eq!(outcomes[2].series().map(Series::len), Some(2));
        assert!(matches!(outcomes[3], TickerOutcome::Empty { .. }));
    }

    #[tokio::test]
    async fn test_invalid_symbol_fails_alone() {
        let store = InMemoryStore::new()
            .with_bars("AAA", bars(&[1.0, 2.0]))
            .with_bars("BBB", bars(&[3.0, 4.0]));

        let outcomes = fetch_all(
            &store,
            &tickers(&["AAA", "BRK/B", "BBB"]),
            &range(),
            Duration::from_secs(1),
        )
        .await;

        assert!(outcomes[0].is_loaded());
        assert!(outcomes[2].is_loaded());
        match &outcomes[1] {
            TickerOutcome::Failed { ticker, reason } => {
                assert_eq!(ticker, "BRK/B");
                assert!(reason.contains("Invalid ticker symbol"));
            }
            other => panic!("expected invalid symbol failure, got {:?}", other),
        }
    }

    struct SlowStore;

    #[async_trait::async_trait]
    impl SeriesStore for SlowStore {
        async fn fetch_series(&self, ticker: &str, _range: &DateRange) -> Result<Series> {
            if ticker == "SLOW" {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            Series::new(ticker, bars(&[10.0]))
        }
    }

    #[tokio::test]
    async fn test_timeout_becomes_failure_without_blocking_siblings() {
        let outcomes = fetch_all(
            &SlowStore,
            &tickers(&["FAST", "SLOW"]),
            &range(),
            Duration::from_millis(50),
        )
        .await;

        assert!(outcomes[0].is_loaded());
        match &outcomes[1] {
            TickerOutcome::Failed { ticker, reason } => {
                assert_eq!(ticker, "SLOW");
                assert!(reason.contains("timed out"));
            }
            other => panic!("expected timeout failure, got {:?}", other),
        }
    }
}
