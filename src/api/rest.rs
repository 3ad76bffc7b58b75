// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/`. None require authentication; the CORS
// layer admits only the configured dashboard origins.
//
// Market data errors surface as 404/400 with a `{"detail": ...}` body. Model
// and news-feed failures never do; the analysis service substitutes its
// heuristic result instead.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Json, Query, State,
    },
    http::{header, HeaderValue, Method},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use crate::api::ApiError;
use crate::app_state::AppState;
use crate::indicators::ema::calculate_ema;
use crate::indicators::regression::next_close_forecast;
use crate::indicators::sma::calculate_sma;
use crate::market_data::{Period, PriceSeries, Quote, YearStats};
use crate::news::{NewsQuery, MAX_LIVE_ITEMS};
use crate::types::{ChatAnswer, NewsDigest, NewsItem, TrendVerdict};

/// Window used for both chart overlays.
const OVERLAY_WINDOW: usize = 20;

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/companies", get(companies))
        .route("/api/history", get(history))
        .route("/api/quote", get(quote))
        .route("/api/trend_ai", get(trend_ai))
        .route("/api/chat", post(chat))
        .route("/api/news_summarize", post(news_summarize))
        .route("/api/news_summarize_live", get(news_summarize_live))
        .layer(cors_layer(&state.config.allowed_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(origin = %o, error = %e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true)
}

fn default_period() -> String {
    "6mo".to_string()
}

/// Full history plus the slice selected by `period`. An empty slice is a 404.
fn load_window(
    state: &AppState,
    symbol: &str,
    period: &str,
    empty_detail: impl FnOnce() -> String,
) -> Result<(PriceSeries, PriceSeries), ApiError> {
    let full = state.prices.load(symbol)?;
    let display = full.slice_period(Period::parse_or_default(period));
    if display.is_empty() {
        return Err(ApiError::NotFound(empty_detail()));
    }
    Ok((full, display))
}

// =============================================================================
// Health & catalogue
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    server_time: i64,
    uptime_secs: u64,
    llm_configured: bool,
    model: Option<String>,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let resp = HealthResponse {
        status: "ok",
        server_time: chrono::Utc::now().timestamp_millis(),
        uptime_secs: state.uptime_secs(),
        llm_configured: state.analysis.model_configured(),
        model: state.analysis.model_name().map(str::to_string),
    };
    Json(resp)
}

async fn companies(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.prices.available_symbols())
}

// =============================================================================
// History & quote
// =============================================================================

#[derive(Deserialize)]
struct HistoryParams {
    symbol: String,
    #[serde(default = "default_period")]
    period: String,
}

#[derive(Serialize)]
struct Point {
    t: i64,
    o: f64,
    h: f64,
    l: f64,
    c: f64,
    v: f64,
}

#[derive(Serialize)]
struct Indicators {
    sma20: Vec<Option<f64>>,
    ema20: Vec<f64>,
}

#[derive(Serialize)]
struct Prediction {
    next_day_close_forecast: Option<f64>,
}

#[derive(Serialize)]
struct HistoryResponse {
    symbol: String,
    period: String,
    interval: &'static str,
    points: Vec<Point>,
    indicators: Indicators,
    stats: YearStats,
    prediction: Prediction,
}

async fn history(
    State(state): State<Arc<AppState>>,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let Query(params) = params?;
    let (full, display) = load_window(&state, &params.symbol, &params.period, || {
        format!("No data for {} in mock CSV", params.symbol)
    })?;

    let closes = display.closes();
    let points = display
        .bars()
        .iter()
        .map(|b| Point {
            t: b.timestamp_ms(),
            o: b.open,
            h: b.high,
            l: b.low,
            c: b.close,
            v: b.volume,
        })
        .collect();

    Ok(Json(HistoryResponse {
        symbol: params.symbol.to_uppercase(),
        period: params.period.clone(),
        interval: "1d",
        points,
        indicators: Indicators {
            sma20: calculate_sma(&closes, OVERLAY_WINDOW),
            ema20: calculate_ema(&closes, OVERLAY_WINDOW),
        },
        stats: YearStats::from_series(&full),
        prediction: Prediction {
            next_day_close_forecast: next_close_forecast(&closes),
        },
    }))
}

#[derive(Deserialize)]
struct QuoteParams {
    symbol: String,
}

async fn quote(
    State(state): State<Arc<AppState>>,
    params: Result<Query<QuoteParams>, QueryRejection>,
) -> Result<Json<Quote>, ApiError> {
    let Query(params) = params?;
    let series = state.prices.load(&params.symbol)?;
    Quote::from_series(&series)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No data for {}", params.symbol)))
}

// =============================================================================
// Trend
// =============================================================================

async fn trend_ai(
    State(state): State<Arc<AppState>>,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> Result<Json<TrendVerdict>, ApiError> {
    let Query(params) = params?;
    let (_, display) = load_window(&state, &params.symbol, &params.period, || {
        format!("No data for {} in period {}", params.symbol, params.period)
    })?;
    let verdict = state
        .analysis
        .classify_trend(&params.symbol, &params.period, &display)
        .await;
    Ok(Json(verdict))
}

// =============================================================================
// Chat
// =============================================================================

#[derive(Deserialize)]
struct ChatRequest {
    symbol: String,
    #[serde(default = "default_period")]
    period: String,
    /// Raw caller history; malformed entries are dropped downstream.
    #[serde(default)]
    messages: Vec<Value>,
}

async fn chat(
    State(state): State<Arc<AppState>>,
    req: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatAnswer>, ApiError> {
    let Json(req) = req?;
    let (full, display) = load_window(&state, &req.symbol, &req.period, || {
        format!("No data for {} in period {}", req.symbol, req.period)
    })?;
    info!(symbol = %req.symbol, turns = req.messages.len(), "chat request");
    let answer = state
        .analysis
        .chat(&full, &display, &req.period, &req.messages)
        .await;
    Ok(Json(answer))
}

// =============================================================================
// News
// =============================================================================

#[derive(Deserialize)]
struct NewsSummarizeRequest {
    #[serde(default)]
    symbol: Option<String>,
    items: Vec<NewsItem>,
}

async fn news_summarize(
    State(state): State<Arc<AppState>>,
    req: Result<Json<NewsSummarizeRequest>, JsonRejection>,
) -> Result<Json<NewsDigest>, ApiError> {
    let Json(req) = req?;
    if req.items.is_empty() || req.items.len() > MAX_LIVE_ITEMS {
        return Err(ApiError::BadRequest(format!(
            "items must contain between 1 and {MAX_LIVE_ITEMS} entries, got {}",
            req.items.len()
        )));
    }
    let digest = state
        .analysis
        .summarize_news(req.symbol.as_deref(), &req.items)
        .await;
    Ok(Json(digest))
}

#[derive(Deserialize)]
struct LiveNewsParams {
    symbol: String,
    /// Signed so that zero or negative counts clamp to one item instead of
    /// failing to deserialise.
    #[serde(default = "default_live_n")]
    n: i64,
    region: Option<String>,
    lang: Option<String>,
}

fn default_live_n() -> i64 {
    10
}

async fn news_summarize_live(
    State(state): State<Arc<AppState>>,
    params: Result<Query<LiveNewsParams>, QueryRejection>,
) -> Result<Json<NewsDigest>, ApiError> {
    let Query(params) = params?;
    let query = NewsQuery {
        symbol: params.symbol,
        limit: usize::try_from(params.n).unwrap_or(0),
        region: params
            .region
            .unwrap_or_else(|| state.config.news_region.clone()),
        lang: params.lang.unwrap_or_else(|| state.config.news_lang.clone()),
    };
    Ok(Json(state.analysis.summarize_live(&query).await))
}

// =============================================================================
// Tests
// =============================================================================
