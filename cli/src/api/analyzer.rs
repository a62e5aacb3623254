//! High-level stock analyzer for easy library usage

use crate::{
    error::{AnalyticsError, Result},
    models::{
        dedup_symbols, normalize_symbol, CompareResult, CompareStatus, DateRange, FetchStatus,
        PerformanceMetadata, PredictionResult, Series, TickerInfo, TickerStatus,
    },
    services::{fetch_all, MetadataStore, SeriesStore, TickerOutcome},
    utils::{
        align_series, normalize_performance, predict_series, round_closes, Timer,
        DEFAULT_FORECAST_HORIZON, MIN_FIT_POINTS,
    },
};
use futures::future::join_all;
use std::{collections::BTreeMap, sync::Arc, time::Duration};
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    /// Calendar days extrapolated by `predict`.
    pub forecast_horizon_days: usize,
    /// Upper bound on a single collaborator call.
    pub fetch_timeout: Duration,
}

impl AnalyzerConfig {
    /// Fewest closes `predict` will fit a model to.
    pub fn min_fit_points(&self) -> usize {
        MIN_FIT_POINTS
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            forecast_horizon_days: DEFAULT_FORECAST_HORIZON,
            fetch_timeout: Duration::from_secs(10),
        }
    }
}

/// High-level interface over the series and metadata collaborators.
///
/// Cheap to clone; the stores are shared behind `Arc`.
#[derive(Clone)]
pub struct StockAnalyzer {
    series_store: Arc<dyn SeriesStore>,
    metadata_store: Option<Arc<dyn MetadataStore>>,
    config: AnalyzerConfig,
}

impl StockAnalyzer {
    /// Analyzer with default configuration and no metadata source.
    pub fn new(series_store: Arc<dyn SeriesStore>) -> Self {
        Self {
            series_store,
            metadata_store: None,
            config: AnalyzerConfig::default(),
        }
    }

    pub(crate) fn from_parts(
        series_store: Arc<dyn SeriesStore>,
        metadata_store: Option<Arc<dyn MetadataStore>>,
        config: AnalyzerConfig,
    ) -> Self {
        Self {
            series_store,
            metadata_store,
            config,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Raw daily bars for one ticker.
    #[instrument(skip(self, range), fields(range = %range))]
    pub async fn history(&self, ticker: &str, range: &DateRange) -> Result<Series> {
        let ticker = normalize_symbol(ticker)?;
        let fetch = self.series_store.fetch_series(&ticker, range);

        let series = tokio::time::timeout(self.config.fetch_timeout, fetch)
            .await
            .map_err(|_| {
                AnalyticsError::fetch(
                    &ticker,
                    format!("fetch timed out after {}s", self.config.fetch_timeout.as_secs_f64()),
                )
            })??;

        if series.is_empty() {
            return Err(AnalyticsError::empty(&ticker));
        }

        debug!(ticker = %ticker, bars = series.len(), "Loaded history");
        Ok(series)
    }

    /// Descriptive metadata for one ticker.
    #[instrument(skip(self))]
    pub async fn info(&self, ticker: &str) -> Result<TickerInfo> {
        let ticker = normalize_symbol(ticker)?;
        let store = self
            .metadata_store
            .as_ref()
            .ok_or_else(|| AnalyticsError::empty(&ticker))?;

        tokio::time::timeout(self.config.fetch_timeout, store.fetch_metadata(&ticker))
            .await
            .map_err(|_| AnalyticsError::fetch(&ticker, "metadata fetch timed out"))?
    }

    /// Align the requested tickers on a shared date axis with relative
    /// performance. Tickers that fail or return nothing are skipped and
    /// reported in the status block.
    #[instrument(skip(self, range), fields(range = %range))]
    pub async fn compare(&self, tickers: &[String], range: &DateRange) -> Result<CompareResult> {
        let tickers = requested_symbols(tickers)?;
        let timer = Timer::start("compare");

        let outcomes = fetch_all(
            self.series_store.as_ref(),
            &tickers,
            range,
            self.config.fetch_timeout,
        )
        .await;

        let statuses: Vec<TickerStatus> = outcomes.iter().map(ticker_status).collect();
        let loaded: Vec<Series> = outcomes
            .into_iter()
            .filter_map(|outcome| match outcome {
                TickerOutcome::Loaded(series) => Some(series),
                _ => None,
            })
            .collect();

        let mut rows = align_series(&loaded);
        normalize_performance(&mut rows);
        round_closes(&mut rows);

        let metadata = self.resolve_metadata(&loaded).await;

        let status = match loaded.len() {
            0 => CompareStatus::NoData,
            n if n == tickers.len() => CompareStatus::Complete,
            _ => CompareStatus::Partial,
        };

        info!(
            requested = tickers.len(),
            loaded = loaded.len(),
            rows = rows.len(),
            status = ?status,
            "Comparison complete"
        );
        timer.log_elapsed();

        Ok(CompareResult {
            tickers,
            rows,
            metadata,
            statuses,
            status,
        })
    }

    /// Fit linear and quadratic trends to one ticker and forecast
    /// `forecast_horizon_days` calendar days ahead.
    #[instrument(skip(self, range), fields(range = %range))]
    pub async fn predict(&self, ticker: &str, range: &DateRange) -> Result<PredictionResult> {
        let timer = Timer::start("predict");
        let series = self.history(ticker, range).await?;
        let result = predict_series(&series, self.config.forecast_horizon_days)?;

        info!(
            ticker = %result.ticker,
            data_points = result.stats.data_points,
            linear_r2 = result.stats.linear_r_squared,
            "Prediction complete"
        );
        timer.log_elapsed();
        Ok(result)
    }

    /// Metadata for every loaded ticker. A metadata failure only loses the
    /// descriptive fields; the price-derived fallback is always available.
    async fn resolve_metadata(&self, loaded: &[Series]) -> BTreeMap<String, PerformanceMetadata> {
        let lookups = loaded.iter().map(|series| async move {
            let info = match &self.metadata_store {
                Some(store) => {
                    let fetch = store.fetch_metadata(series.ticker());
                    match tokio::time::timeout(self.config.fetch_timeout, fetch).await {
                        Ok(Ok(info)) => Some(info),
                        Ok(Err(e)) => {
                            debug!(ticker = series.ticker(), error = %e, "No metadata, using fallback");
                            None
                        }
                        Err(_) => {
                            debug!(ticker = series.ticker(), "Metadata fetch timed out, using fallback");
                            None
                        }
                    }
                }
                None => None,
            };

            (
                series.ticker().to_string(),
                PerformanceMetadata::resolve(series.ticker(), info.as_ref(), series.last_close()),
            )
        });

        join_all(lookups).await.into_iter().collect()
    }
}

/// Drop blanks and repeats, keeping the first occurrence. Invalid symbols stay
/// in the list and fail individually during the fetch. The request is only
/// rejected when none of the symbols could be a ticker.
fn requested_symbols(tickers: &[String]) -> Result<Vec<String>> {
    let symbols = dedup_symbols(tickers.iter().map(String::as_str));
    if !symbols.iter().any(|s| normalize_symbol(s).is_ok()) {
        return Err(AnalyticsError::InvalidTicker(symbols.join(",")));
    }
    Ok(symbols)
}

fn ticker_status(outcome: &TickerOutcome) -> TickerStatus {
    match outcome {
        TickerOutcome::Loaded(series) => TickerStatus {
            ticker: series.ticker().to_string(),
            status: FetchStatus::Ok,
            bars: series.len(),
            message: None,
        },
        TickerOutcome::Empty { ticker } => TickerStatus {
            ticker: ticker.clone(),
            status: FetchStatus::Empty,
            bars: 0,
            message: Some(AnalyticsError::empty(ticker).to_string()),
        },
        TickerOutcome::Failed { ticker, reason } => TickerStatus {
            ticker: ticker.clone(),
            status: FetchStatus::Error,
            bars: 0,
            message: Some(reason.clone()),
        },
    }
}
