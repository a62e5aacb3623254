use crate::{
    error::{AnalyticsError, Result},
    models::{normalize_symbol, Bar, DateRange, Series, TickerInfo, TickerInfoData},
    services::store::{MetadataStore, SeriesStore},
    utils::{parse_date, Logger, Timer},
};
use serde::Deserialize;
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

const TICKER_INFO_FILE: &str = "ticker_info.json";

/// One line of `<TICKER>.csv`.
#[derive(Debug, Deserialize)]
struct RawBar {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    // Some exports write volume as a float.
    volume: f64,
}

impl RawBar {
    fn into_bar(self) -> anyhow::Result<Bar> {
        let date = parse_date(&self.date)?;
        if !self.volume.is_finite() || self.volume < 0.0 {
            anyhow::bail!("invalid volume {} on {}", self.volume, self.date);
        }
        Ok(Bar::new(
            date,
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume.round() as u64,
        ))
    }
}

/// Reads daily bars from `<data_dir>/<TICKER>.csv` and metadata from
/// `<data_dir>/ticker_info.json`.
pub struct CsvSeriesStore {
    data_dir: PathBuf,
    logger: Logger,
}

impl CsvSeriesStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let logger = Logger::new("CSV_STORE");
        logger.debug(&format!("Reading market data from {}", data_dir.display()));
        Self { data_dir, logger }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn series_path(&self, ticker: &str) -> PathBuf {
        self.data_dir.join(format!("{}.csv", ticker))
    }

    /// Tickers with a CSV file in the data directory, sorted.
    pub fn available_tickers(&self) -> anyhow::Result<Vec<String>> {
        let mut tickers = Vec::new();
        for entry in std::fs::read_dir(&self.data_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("csv") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                tickers.push(stem.to_string());
            }
        }
        tickers.sort();
        Ok(tickers)
    }

    fn parse_csv_content(&self, content: &str, ticker: &str) -> anyhow::Result<Vec<Bar>> {
        let mut reader = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for (line, result) in reader.deserialize::<RawBar>().enumerate() {
            let raw = result?;
            let bar = raw
                .into_bar()
                .map_err(|e| anyhow::anyhow!("{} row {}: {}", ticker, line + 1, e))?;
            bars.push(bar);
        }

        Ok(bars)
    }

    async fn load_ticker_info(&self) -> Result<Option<TickerInfoData>> {
        let path = self.data_dir.join(TICKER_INFO_FILE);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AnalyticsError::fetch(
                    TICKER_INFO_FILE,
                    format!("failed to read {}: {}", path.display(), e),
                ))
            }
        };

        let data: TickerInfoData = serde_json::from_str(&content).map_err(|e| {
            AnalyticsError::fetch(TICKER_INFO_FILE, format!("invalid JSON: {}", e))
        })?;
        Ok(Some(data))
    }
}

#[async_trait::async_trait]
impl SeriesStore for CsvSeriesStore {
    async fn fetch_series(&self, ticker: &str, range: &DateRange) -> Result<Series> {
        let ticker = normalize_symbol(ticker)?;
        let path = self.series_path(&ticker);
        let timer = Timer::start(&format!("{} csv read", ticker));

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                self.logger.debug(&format!("No data file for {}", ticker));
                return Err(AnalyticsError::empty(&ticker));
            }
            Err(e) => {
                self.logger.warn_with_error(&format!("Failed to read {}", path.display()), &e);
                return Err(AnalyticsError::fetch(&ticker, e.to_string()));
            }
        };

        let bars = self.parse_csv_content(&content, &ticker).map_err(|e| {
            self.logger.warn(&format!("Garbled data file for {}: {}", ticker, e));
            AnalyticsError::fetch(&ticker, e.to_string())
        })?;

        let total = bars.len();
        let series = Series::new(ticker.as_str(), bars)?.retain_dates(|date| range.contains(date));

        self.logger.debug(&format!(
            "Loaded {}.csv: {} of {} bars in {}",
            ticker,
            series.len(),
            total,
            range
        ));
        timer.log_elapsed();

        if series.is_empty() {
            return Err(AnalyticsError::empty(&ticker));
        }
        Ok(series)
    }
}

#[async_trait::async_trait]
impl MetadataStore for CsvSeriesStore {
    async fn fetch_metadata(&self, ticker: &str) -> Result<TickerInfo> {
        let ticker = normalize_symbol(ticker)?;
        self.load_ticker_info()
            .await?
            .and_then(|mut data| data.remove(&ticker))
            .ok_or_else(|| AnalyticsError::empty(&ticker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const AAPL_CSV: &str = "date,open,high,low,close,volume\n\
2024-01-03,184.22,185.88,183.43,184.25,58414500\n\
2024-01-02,187.15,188.44,183.89,185.64,82488700\n\
2024-01-04,182.15,183.09,180.88,181.91,71983600.0\n";

    fn store_with(files: &[(&str, &str)]) -> (TempDir, CsvSeriesStore) {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            fs::write(dir.path().join(name), content).unwrap();
        }
        let store = CsvSeriesStore::new(dir.path());
        (dir, store)
    }

    fn january() -> DateRange {
        DateRange::parse("2024-01-01", "2024-01-31").unwrap()
    }

    #[tokio::test]
    async fn test_reads_sorted_bars_in_range() {
        let (_dir, store) = store_with(&[("AAPL.csv", AAPL_CSV)]);

        let series = store.fetch_series("aapl", &january()).await.unwrap();
        assert_eq!(series.ticker(), "AAPL");
        assert_eq!(series.closes(), vec![185.64, 184.25, 181.91]);
        assert_eq!(series.bars()[2].volume, 71_983_600);

        let narrow = DateRange::parse("2024-01-03", "2024-01-03").unwrap();
        let series = store.fetch_series("AAPL", &narrow).await.unwrap();
        assert_eq!(series.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_file_and_empty_window_are_empty_results() {
        let (_dir, store) = store_with(&[("AAPL.csv", AAPL_CSV)]);

        assert!(matches!(
            store.fetch_series("MSFT", &january()).await,
            Err(AnalyticsError::EmptyResult { .. })
        ));

        let february = DateRange::parse("2024-02-01", "2024-02-29").unwrap();
        assert!(matches!(
            store.fetch_series("AAPL", &february).await,
            Err(AnalyticsError::EmptyResult { .. })
        ));
    }

    #[tokio::test]
    async fn test_garbled_file_is_fetch_error() {
        let (_dir, store) = store_with(&[
            ("BAD.csv", "date,open,high,low,close,volume\n2024-01-02,abc,1,1,1,1\n"),
            ("DATE.csv", "date,open,high,low,close,volume\n01/02/2024,1,1,1,1,1\n"),
        ]);

        assert!(matches!(
            store.fetch_series("BAD", &january()).await,
            Err(AnalyticsError::Fetch { .. })
        ));
        assert!(matches!(
            store.fetch_series("DATE", &january()).await,
            Err(AnalyticsError::Fetch { .. })
        ));
    }

    #[tokio::test]
    async fn test_path_like_ticker_is_rejected() {
        let (_dir, store) = store_with(&[]);
        assert!(matches!(
            store.fetch_series("../secret", &january()).await,
            Err(AnalyticsError::InvalidTicker(_))
        ));
    }

    #[tokio::test]
    async fn test_metadata_from_ticker_info_json() {
        let info = r#"{"AAPL": {"company_name": "Apple Inc.", "current_price": 181.91, "market_cap": 2.8e12}}"#;
        let (_dir, store) = store_with(&[("AAPL.csv", AAPL_CSV), (TICKER_INFO_FILE, info)]);

        let aapl = store.fetch_metadata("AAPL").await.unwrap();
        assert_eq!(aapl.company_name.as_deref(), Some("Apple Inc."));
        assert_eq!(aapl.market_cap, Some(2.8e12));
        assert!(aapl.sector.is_none());

        assert!(matches!(
            store.fetch_metadata("MSFT").await,
            Err(AnalyticsError::EmptyResult { .. })
        ));
        assert_eq!(store.available_tickers().unwrap(), vec!["AAPL".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_ticker_info_is_empty_and_garbled_is_fetch_error() {
        let (_dir, store) = store_with(&[]);
        assert!(matches!(
            store.fetch_metadata("AAPL").await,
            Err(AnalyticsError::EmptyResult { .. })
        ));

        let (_dir, store) = store_with(&[(TICKER_INFO_FILE, "{not json")]);
        assert!(matches!(
            store.fetch_metadata("AAPL").await,
            Err(AnalyticsError::Fetch { .. })
        ));
    }
}
