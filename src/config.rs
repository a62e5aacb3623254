use anyhow::Context;
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

// Holds application-wide settings, loadable from YAML or the environment
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub node_name: String,
    pub environment: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub default_ticker: String,
    pub default_compare_tickers: Vec<String>,
    pub history_default_days: i64,
    pub prediction_default_days: i64,
    pub forecast_horizon_days: usize,
    pub fetch_timeout_secs: u64,
    pub market_timezone: String,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_name: "tickertrend-server".to_string(),
            environment: "development".to_string(),
            port: 5000,
            data_dir: PathBuf::from("./data"),
            default_ticker: "AAPL".to_string(),
            default_compare_tickers: vec!["AAPL".to_string(), "GOOGL".to_string(), "MSFT".to_string()],
            history_default_days: 30,
            prediction_default_days: 90,
            forecast_horizon_days: 7,
            fetch_timeout_secs: 10,
            market_timezone: "America/New_York".to_string(),
            rate_limit_per_second: 10,
            rate_limit_burst: 20,
        }
    }
}

impl AppConfig {
    // Load configuration from YAML file or environment variables
    pub fn load() -> anyhow::Result<Self> {
        let config = match env::var("CONFIG_FILE") {
            Ok(config_file) => Self::from_yaml(&config_file)?,
            Err(_) => Self::from_env()?,
        };
        config.market_tz()?;
        Ok(config)
    }

    // Load configuration from YAML file; missing keys keep their defaults
    pub fn from_yaml(file_path: &str) -> anyhow::Result<Self> {
        let yaml_content = fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read config file {}", file_path))?;

        serde_yaml::from_str(&yaml_content).context("Failed to parse YAML config")
    }

    // Load all configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present
        let defaults = Self::default();

        let default_compare_tickers = match env::var("DEFAULT_COMPARE_TICKERS") {
            Ok(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            Err(_) => defaults.default_compare_tickers,
        };

        Ok(Self {
            node_name: env::var("NODE_NAME").unwrap_or(defaults.node_name),
            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            port: parse_var("PORT", defaults.port)?,
            data_dir: env::var("DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            default_ticker: env::var("DEFAULT_TICKER").unwrap_or(defaults.default_ticker),
            default_compare_tickers,
            history_default_days: parse_var("HISTORY_DEFAULT_DAYS", defaults.history_default_days)?,
            prediction_default_days: parse_var("PREDICTION_DEFAULT_DAYS", defaults.prediction_default_days)?,
            forecast_horizon_days: parse_var("FORECAST_HORIZON_DAYS", defaults.forecast_horizon_days)?,
            fetch_timeout_secs: parse_var("FETCH_TIMEOUT_SECS", defaults.fetch_timeout_secs)?,
            market_timezone: env::var("MARKET_TIMEZONE").unwrap_or(defaults.market_timezone),
            rate_limit_per_second: parse_var("RATE_LIMIT_PER_SECOND", defaults.rate_limit_per_second)?,
            rate_limit_burst: parse_var("RATE_LIMIT_BURST", defaults.rate_limit_burst)?,
        })
    }

    pub fn market_tz(&self) -> anyhow::Result<Tz> {
        Tz::from_str(&self.market_timezone)
            .map_err(|e| anyhow::anyhow!("Invalid MARKET_TIMEZONE {:?}: {}", self.market_timezone, e))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

// Unset or blank keeps the default; anything else must parse
fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: {:?} ({})", name, raw, e)),
        _ => Ok(default),
    }
}

/// Calendar date right now in the market's timezone.
pub fn market_today(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_overrides_and_defaults() {
        let dir = std::env::temp_dir().join(format!("tickertrend-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.yml");
        fs::write(
            &path,
            "node_name: node-a\nport: 8080\ndefault_compare_tickers: [SPY, QQQ]\nmarket_timezone: Europe/London\n",
        )
        .unwrap();

        let config = AppConfig::from_yaml(path.to_str().unwrap()).unwrap();
        assert_eq!(config.node_name, "node-a");
        assert_eq!(config.port, 8080);
        assert_eq!(config.default_compare_tickers, vec!["SPY", "QQQ"]);
        assert_eq!(config.history_default_days, 30);
        assert_eq!(config.prediction_default_days, 90);
        assert_eq!(config.market_tz().unwrap(), chrono_tz::Europe::London);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_timezone_is_an_error() {
        let config = AppConfig {
            market_timezone: "Mars/Olympus".to_string(),
            ..Default::default()
        };
        assert!(config.market_tz().is_err());
        assert_eq!(AppConfig::default().market_tz().unwrap(), chrono_tz::America::New_York);
    }

    #[test]
    fn test_missing_yaml_file_is_an_error() {
        assert!(AppConfig::from_yaml("/nonexistent/tickertrend.yml").is_err());
    }
}
