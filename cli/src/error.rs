use thiserror::Error;

/// Why a ticker could not be modelled.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InsufficientReason {
    /// Fewer historical points than the fitter accepts.
    #[error("{actual} data points, at least {required} required")]
    TooFewPoints { actual: usize, required: usize },
    /// The points exist but the least-squares system could not be solved.
    #[error("degenerate fit: {0}")]
    DegenerateFit(String),
}

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("No data found for ticker {ticker}")]
    EmptyResult { ticker: String },

    #[error("Failed to fetch data for {ticker}: {message}")]
    Fetch { ticker: String, message: String },

    #[error("Insufficient data for predictions for {ticker}: {reason}")]
    InsufficientData { ticker: String, reason: InsufficientReason },

    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    #[error("Invalid ticker symbol: {0:?}")]
    InvalidTicker(String),

    #[error("Malformed series for {ticker}: {detail}")]
    MalformedSeries { ticker: String, detail: String },
}

impl AnalyticsError {
    pub fn fetch(ticker: &str, message: impl Into<String>) -> Self {
        AnalyticsError::Fetch {
            ticker: ticker.to_string(),
            message: message.into(),
        }
    }

    pub fn empty(ticker: &str) -> Self {
        AnalyticsError::EmptyResult {
            ticker: ticker.to_string(),
        }
    }

    /// True for outcomes that mean "nothing to show" rather than "something broke".
    pub fn is_no_data(&self) -> bool {
        matches!(
            self,
            AnalyticsError::EmptyResult { .. } | AnalyticsError::InsufficientData { .. }
        )
    }

    /// True for errors caused by the caller's request rather than the data.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AnalyticsError::InvalidRange(_) | AnalyticsError::InvalidTicker(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
