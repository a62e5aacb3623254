pub mod api;
pub mod config;
pub mod data_structures;

use crate::data_structures::AppState;
use anyhow::Context;
use std::{net::SocketAddr, sync::Arc};
use tickertrend::api::AnalysisBuilder;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_config = config::AppConfig::load()?;

    // Initialize tracing with node_name in all logs
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();

    // Set a global span with node_name for all subsequent logs
    let _span = tracing::info_span!("node", name = %app_config.node_name).entered();

    tracing::info!("Starting tickertrend-server");
    tracing::info!(
        environment = %app_config.environment,
        port = app_config.port,
        data_dir = %app_config.data_dir.display(),
        "Loaded configuration"
    );

    let analyzer = AnalysisBuilder::new()
        .with_csv_dir(&app_config.data_dir)
        .with_forecast_horizon(app_config.forecast_horizon_days)
        .with_fetch_timeout(app_config.fetch_timeout())
        .build()?;

    let app_state = AppState {
        analyzer,
        market_tz: app_config.market_tz()?,
        config: Arc::new(app_config.clone()),
    };

    // Replenish one request slot every 1000 / rate milliseconds
    let replenish_ms = (1000 / app_config.rate_limit_per_second.max(1)).max(1);
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(replenish_ms)
            .burst_size(app_config.rate_limit_burst)
            .finish()
            .context("Invalid rate limit configuration")?,
    );

    let app = api::router(app_state)
        .layer(GovernorLayer::new(governor_conf))
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], app_config.port));
    tracing::info!(%addr, "Server listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
