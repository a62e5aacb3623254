//! Basic Analysis Example
//!
//! Compares three synthetic tickers and forecasts one of them using an
//! in-memory store, so it runs without any data files.

use chrono::Duration;
use std::{error::Error, sync::Arc};
use tickertrend::prelude::*;
use tickertrend::utils::parse_date;

fn synthetic_bars(start: &str, days: i64, base: f64, drift: f64) -> Result<Vec<Bar>, Box<dyn Error>> {
    let start = parse_date(start)?;
    Ok((0..days)
        .map(|i| {
            let close = base + drift * i as f64 + (i as f64 / 3.0).sin();
            Bar::new(start + Duration::days(i), close - 0.5, close + 1.0, close - 1.0, close, 1_000_000 + i as u64 * 1_000)
        })
        .collect())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logging
    tickertrend::init_logger()?;

    println!("Basic Analysis Example");
    println!("{}", "=".repeat(60));

    let store = InMemoryStore::new()
        .with_bars("AAPL", synthetic_bars("2024-01-01", 60, 185.0, 0.4)?)
        .with_bars("MSFT", synthetic_bars("2024-01-03", 58, 370.0, -0.2)?)
        .with_failing("GOOGL")
        .with_info(
            "AAPL",
            TickerInfo {
                company_name: Some("Apple Inc.".to_string()),
                market_cap: Some(2.8e12),
                ..Default::default()
            },
        );
    let store = Arc::new(store);

    let analyzer = AnalysisBuilder::new()
        .with_series_store(store.clone())
        .with_metadata_store(store)
        .build()?;

    let range = DateRange::parse("2024-01-01", "2024-02-29")?;

    // Example 1: comparison with one unavailable ticker
    println!("\nExample 1: Compare AAPL, GOOGL, MSFT over {}", range);
    let tickers = vec!["AAPL".to_string(), "GOOGL".to_string(), "MSFT".to_string()];
    let comparison = analyzer.compare(&tickers, &range).await?;
    println!("   Status: {:?}, {} aligned rows", comparison.status, comparison.rows.len());
    for status in &comparison.statuses {
        println!("   {}: {:?} ({} bars)", status.ticker, status.status, status.bars);
    }
    if let Some(last) = comparison.rows.last() {
        for ticker in comparison.loaded_tickers() {
            println!("   {} relative performance on {}: {:?}", ticker, last.date, last.relative_index(ticker));
        }
    }

    // Example 2: trend forecast
    println!("\nExample 2: Predict AAPL");
    let prediction = analyzer.predict("AAPL", &range).await?;
    println!(
        "   Linear R²: {}, fitted on {} points",
        prediction.stats.linear_r_squared, prediction.stats.data_points
    );
    for point in &prediction.forecast {
        println!("   {} linear={} poly={}", point.date, point.linear_fit, point.poly_fit);
    }

    Ok(())
}
