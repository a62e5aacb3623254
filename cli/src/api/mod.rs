//! High-level API for easy library usage
//!
//! `StockAnalyzer` wires the stores, the fetcher and the analytics together;
//! `AnalysisBuilder` configures one.

pub mod analyzer;
pub mod builder;

pub use analyzer::{AnalyzerConfig, StockAnalyzer};
pub use builder::AnalysisBuilder;
