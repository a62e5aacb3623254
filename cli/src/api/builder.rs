//! Builder pattern for configuring a `StockAnalyzer`

use crate::api::analyzer::{AnalyzerConfig, StockAnalyzer};
use crate::error::{AnalyticsError, Result};
use crate::services::{CsvSeriesStore, MetadataStore, SeriesStore};
use std::{path::PathBuf, sync::Arc, time::Duration};

/// Fluent configuration for a `StockAnalyzer`.
///
/// # Example
/// ```rust
/// use std::sync::Arc;
/// use tickertrend::api::AnalysisBuilder;
/// use tickertrend::services::InMemoryStore;
///
/// let store = Arc::new(InMemoryStore::new());
/// let analyzer = AnalysisBuilder::new()
///     .with_series_store(store.clone())
///     .with_metadata_store(store)
///     .with_forecast_horizon(7)
///     .build()
///     .unwrap();
/// assert_eq!(analyzer.config().forecast_horizon_days, 7);
/// ```
#[derive(Default)]
pub struct AnalysisBuilder {
    series_store: Option<Arc<dyn SeriesStore>>,
    metadata_store: Option<Arc<dyn MetadataStore>>,
    config: AnalyzerConfig,
}

impl AnalysisBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the source of daily bars (required)
    pub fn with_series_store(mut self, store: Arc<dyn SeriesStore>) -> Self {
        self.series_store = Some(store);
        self
    }

    /// Set the optional source of ticker metadata
    pub fn with_metadata_store(mut self, store: Arc<dyn MetadataStore>) -> Self {
        self.metadata_store = Some(store);
        self
    }

    /// Read bars and metadata from CSV/JSON files in `data_dir`
    pub fn with_csv_dir(self, data_dir: impl Into<PathBuf>) -> Self {
        let store = Arc::new(CsvSeriesStore::new(data_dir));
        self.with_series_store(store.clone()).with_metadata_store(store)
    }

    /// Set how many calendar days `predict` extrapolates
    pub fn with_forecast_horizon(mut self, days: usize) -> Self {
        self.config.forecast_horizon_days = days;
        self
    }

    /// Set the bound on each collaborator call
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.config.fetch_timeout = timeout;
        self
    }

    /// Build a StockAnalyzer with the configured settings
    pub fn build(self) -> Result<StockAnalyzer> {
        let series_store = self.series_store.ok_or_else(|| AnalyticsError::Fetch {
            ticker: String::new(),
            message: "no series store configured".to_string(),
        })?;

        if self.config.forecast_horizon_days == 0 {
            return Err(AnalyticsError::InvalidRange(
                "forecast horizon must be at least one day".to_string(),
            ));
        }

        Ok(StockAnalyzer::from_parts(
            series_store,
            self.metadata_store,
            self.config,
        ))
    }
}
