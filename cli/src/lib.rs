//! # tickertrend - Daily price analytics
//!
//! A Rust library for comparing and extrapolating daily stock prices:
//! - Multi-ticker date alignment with relative performance (base 100)
//! - Linear and quadratic trend fitting over trading-day ordinals
//! - Daily and cumulative percentage change statistics
//! - Pluggable price and metadata sources with isolated per-ticker failures
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use tickertrend::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(InMemoryStore::new());
//!     let analyzer = AnalysisBuilder::new()
//!         .with_series_store(store.clone())
//!         .with_metadata_store(store)
//!         .build()?;
//!     let range = DateRange::parse("2024-01-01", "2024-03-31")?;
//!     let result = analyzer.compare(&["AAPL".to_string()], &range).await?;
//!     println!("Comparison status: {:?}", result.status);
//!     Ok(())
//! }
//! ```

// Core modules - these contain the main functionality
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

// Analysis modules - high-level analysis functionality
pub mod analysis {
    //! Pure analytics over already-fetched series

    /// Date alignment and relative performance
    pub mod compare {
        pub use crate::utils::alignment::*;
    }

    /// Trend models, forecasts and change statistics
    pub mod trend {
        pub use crate::utils::change_stats::*;
        pub use crate::utils::regression::*;
        pub use crate::utils::trend::*;
    }
}

// Data models and types
pub mod data {
    //! Data models and types used throughout the library

    pub use crate::models::analytics::*;
    pub use crate::models::bar::*;
    pub use crate::models::date_range::*;
    pub use crate::models::ticker::*;
}

// Public API for easy library usage
pub mod api;

// Prelude for convenient imports
pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! ```rust
    //! use tickertrend::prelude::*;
    //! ```

    pub use crate::api::{AnalysisBuilder, AnalyzerConfig, StockAnalyzer};
    pub use crate::data::{
        AlignedRow, Bar, CompareResult, CompareStatus, DateRange, PredictionResult, Series,
        TickerInfo, TimeRange,
    };
    pub use crate::error::AnalyticsError;
    pub use crate::services::{CsvSeriesStore, InMemoryStore, MetadataStore, SeriesStore};
}

// Re-export some commonly used utilities
pub use utils::{init_logger, Logger, Timer};
