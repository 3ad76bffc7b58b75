// =============================================================================
// Stock Pulse — Main Entry Point
// =============================================================================
//
// Serves the dashboard API over local CSV price data. The language model is
// optional: without `GROQ_API_KEY` every analysis endpoint answers from its
// deterministic heuristic.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod arbiter;
mod cache;
mod heuristic;
mod indicators;
mod llm;
mod market_data;
mod news;
mod pipeline;
mod runtime_config;
mod signals;
mod types;

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::arbiter::ModelArbiter;
use crate::llm::{GroqClient, TextGenerator};
use crate::news::GoogleNewsRss;
use crate::runtime_config::RuntimeConfig;

const CONFIG_PATH: &str = "runtime_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Stock Pulse — starting up");

    let mut config = RuntimeConfig::load(CONFIG_PATH).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });
    config.apply_env_overrides();

    info!(
        bind_addr = %config.bind_addr,
        cache_ttl_secs = config.cache_ttl_secs,
        origins = ?config.allowed_origins,
        "Configuration resolved"
    );

    // ── 2. Language model (optional) ─────────────────────────────────────
    let generator: Option<Arc<dyn TextGenerator>> = match std::env::var("GROQ_API_KEY") {
        Ok(key) if !key.trim().is_empty() => {
            let client = GroqClient::new(
                key.trim(),
                config.groq_model.clone(),
                config.groq_base_url.clone(),
                config.model_timeout(),
            )?;
            info!(model = %config.groq_model, "Language model enabled");
            Some(Arc::new(client) as Arc<dyn TextGenerator>)
        }
        _ => {
            warn!("GROQ_API_KEY not set — serving heuristic results only");
            None
        }
    };

    // ── 3. Shared state ──────────────────────────────────────────────────
    let news_source = Arc::new(GoogleNewsRss::new(config.model_timeout())?);
    let state = Arc::new(AppState::new(
        config.clone(),
        ModelArbiter::new(generator),
        news_source,
    ));

    info!(
        data_dir = %state.prices.data_dir().display(),
        symbols = state.prices.available_symbols().len(),
        "Price store ready"
    );

    // ── 4. API server ────────────────────────────────────────────────────
    let app = api::rest::router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind API server on {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server failed")?;

    info!("Stock Pulse shut down complete.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    warn!("Shutdown signal received — stopping gracefully");
}
