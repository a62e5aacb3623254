use crate::config::market_today;
use crate::data_structures::{
    AppState, CompareQuery, CompareResponse, ErrorBody, HistoryResponse, InfoResponse, RangeQuery,
};
use axum::{
    Router,
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use tickertrend::{
    data::{Bar, DateRange, PredictionResult, parse_ticker_list},
    error::AnalyticsError,
    utils::format_date,
};
use tracing::{debug, info, instrument, warn};

/// `AnalyticsError` rendered as `{"error": "..."}` with a matching status.
#[derive(Debug)]
pub struct ApiError(AnalyticsError);

impl From<AnalyticsError> for ApiError {
    fn from(err: AnalyticsError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else if self.0.is_no_data() {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::BAD_GATEWAY
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(status = status.as_u16(), error = %self.0, "Request failed");
        } else {
            debug!(status = status.as_u16(), error = %self.0, "Request rejected");
        }
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/stock", get(default_history_handler))
        .route("/api/stock/{ticker}", get(history_handler))
        .route("/api/stock/{ticker}/info", get(info_handler))
        .route("/api/stock/{ticker}/predictions", get(predictions_handler))
        .route("/api/stocks/compare", get(compare_handler))
        .with_state(state)
}

fn resolve_range(
    state: &AppState,
    start: Option<&str>,
    end: Option<&str>,
    default_days: i64,
) -> Result<DateRange, AnalyticsError> {
    DateRange::from_query(start, end, market_today(state.market_tz), default_days)
}

async fn load_history(
    state: &AppState,
    ticker: &str,
    query: &RangeQuery,
) -> Result<Json<HistoryResponse>, ApiError> {
    let range = resolve_range(
        state,
        query.start_date.as_deref(),
        query.end_date.as_deref(),
        state.config.history_default_days,
    )?;

    let series = state.analyzer.history(ticker, &range).await?;
    info!(ticker = series.ticker(), bars = series.len(), "Returning history");

    Ok(Json(HistoryResponse {
        ticker: series.ticker().to_string(),
        data: series.bars().iter().map(Bar::rounded).collect(),
        start_date: format_date(range.start()),
        end_date: format_date(range.end()),
    }))
}

#[instrument(skip(state))]
pub async fn default_history_handler(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let ticker = state.config.default_ticker.clone();
    load_history(&state, &ticker, &query).await
}

#[instrument(skip(state))]
pub async fn history_handler(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    load_history(&state, &ticker, &query).await
}

#[instrument(skip(state))]
pub async fn info_handler(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<InfoResponse>, ApiError> {
    let info = state.analyzer.info(&ticker).await?;
    Ok(Json(InfoResponse {
        ticker: ticker.trim().to_uppercase(),
        info,
    }))
}

#[instrument(skip(state))]
pub async fn compare_handler(
    State(state): State<AppState>,
    Query(query): Query<CompareQuery>,
) -> Result<Json<CompareResponse>, ApiError> {
    let tickers = parse_ticker_list(
        query.tickers.as_deref().unwrap_or_default(),
        &state.config.default_compare_tickers,
    );
    let range = resolve_range(
        &state,
        query.start_date.as_deref(),
        query.end_date.as_deref(),
        state.config.history_default_days,
    )?;

    let result = state.analyzer.compare(&tickers, &range).await?;

    Ok(Json(CompareResponse {
        result,
        start_date: format_date(range.start()),
        end_date: format_date(range.end()),
    }))
}

#[instrument(skip(state))]
pub async fn predictions_handler(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<PredictionResult>, ApiError> {
    let range = resolve_range(
        &state,
        query.start_date.as_deref(),
        query.end_date.as_deref(),
        state.config.prediction_default_days,
    )?;

    let result = state.analyzer.predict(&ticker, &range).await?;
    Ok(Json(result))
}
