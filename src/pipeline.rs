// =============================================================================
// Analysis Pipeline — heuristic, model arbiter and cache wired per request
// =============================================================================
//
// Every request computes (or can compute) its deterministic heuristic result
// first. When a model is configured the arbiter is consulted; an accepted
// answer replaces the heuristic, a declined one is logged and the heuristic is
// served. Trend and news results are memoised in the response caches; chat
// answers are not.
// =============================================================================

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::arbiter::{chat::sanitize_history, ArbiterOutcome, ModelArbiter};
use crate::cache::{fingerprint, ResponseCache};
use crate::heuristic::market_summary::{unavailable_answer, unconfigured_answer};
use crate::heuristic::{self, market_summary, no_recent_headlines, summarize_headlines};
use crate::llm::ModelFailure;
use crate::market_data::PriceSeries;
use crate::news::{NewsQuery, NewsSource};
use crate::signals::TrendFeatures;
use crate::types::{ChatAnswer, NewsDigest, NewsItem, TrendVerdict};

/// Shared analysis entry point held by the application state.
pub struct AnalysisService {
    arbiter: ModelArbiter,
    trend_cache: Arc<ResponseCache<TrendVerdict>>,
    news_cache: Arc<ResponseCache<NewsDigest>>,
    news_source: Arc<dyn NewsSource>,
}

impl AnalysisService {
    pub fn new(
        arbiter: ModelArbiter,
        trend_cache: Arc<ResponseCache<TrendVerdict>>,
        news_cache: Arc<ResponseCache<NewsDigest>>,
        news_source: Arc<dyn NewsSource>,
    ) -> Self {
        Self {
            arbiter,
            trend_cache,
            news_cache,
            news_source,
        }
    }

    pub fn model_configured(&self) -> bool {
        self.arbiter.is_configured()
    }

    pub fn model_name(&self) -> Option<&str> {
        self.arbiter.model_name()
    }

    // -------------------------------------------------------------------------
    // Trend
    // -------------------------------------------------------------------------

    /// Classify the trend of `display` (the period window of `symbol`).
    pub async fn classify_trend(
        &self,
        symbol: &str,
        period: &str,
        display: &PriceSeries,
    ) -> TrendVerdict {
        let last_date = display
            .last()
            .map(|b| b.date.to_string())
            .unwrap_or_default();
        let key = fingerprint(&[
            "trend".to_string(),
            symbol.to_uppercase(),
            period.to_string(),
            last_date,
            display.len().to_string(),
        ]);
        if let Some(cached) = self.trend_cache.get(&key) {
            return cached;
        }

        let closes = display.closes();
        let fallback = heuristic::classify_trend(&closes);

        let verdict = if self.arbiter.is_configured() {
            let features = TrendFeatures::extract(&closes);
            match self.arbiter.classify_trend(&features).await {
                ArbiterOutcome::Accepted(v) => v,
                ArbiterOutcome::Declined(failure) => {
                    log_decline("trend", symbol, &failure);
                    fallback
                }
            }
        } else {
            fallback
        };

        info!(
            symbol = %symbol,
            label = %verdict.label,
            confidence = verdict.confidence,
            origin = %verdict.origin,
            "trend classified"
        );
        self.trend_cache.put(key, verdict.clone());
        verdict
    }

    // -------------------------------------------------------------------------
    // News
    // -------------------------------------------------------------------------

    /// Summarise caller-supplied headlines.
    pub async fn summarize_news(&self, symbol: Option<&str>, items: &[NewsItem]) -> NewsDigest {
        let key = news_key(symbol, items);
        if let Some(cached) = self.news_cache.get(&key) {
            return cached;
        }
        let digest = self.digest(symbol, items).await;
        self.news_cache.put(key, digest.clone());
        digest
    }

    /// Fetch recent headlines for `query.symbol` and summarise them. A failed
    /// fetch counts as zero headlines.
    pub async fn summarize_live(&self, query: &NewsQuery) -> NewsDigest {
        let key = fingerprint(&[format!(
            "live::{}::{}::{}::{}",
            query.symbol,
            query.clamped_limit(),
            query.region,
            query.lang
        )]);
        if let Some(cached) = self.news_cache.get(&key) {
            return cached;
        }

        let items = match self.news_source.fetch(query).await {
            Ok(items) => items,
            Err(e) => {
                warn!(symbol = %query.symbol, error = %e, "news source failed, treating as empty");
                Vec::new()
            }
        };

        let digest = if items.is_empty() {
            no_recent_headlines()
        } else {
            self.digest(Some(&query.symbol), &items).await
        };
        self.news_cache.put(key, digest.clone());
        digest
    }

    async fn digest(&self, symbol: Option<&str>, items: &[NewsItem]) -> NewsDigest {
        if !self.arbiter.is_configured() {
            return summarize_headlines(items);
        }
        match self.arbiter.summarize_news(symbol, items).await {
            ArbiterOutcome::Accepted(d) => d,
            ArbiterOutcome::Declined(failure) => {
                log_decline("news", symbol.unwrap_or("-"), &failure);
                summarize_headlines(items)
            }
        }
    }

    // -------------------------------------------------------------------------
    // Chat
    // -------------------------------------------------------------------------

    /// Answer a chat turn about `symbol`. `full` is the whole history (for the
    /// 52-week figures), `display` the selected period window.
    pub async fn chat(
        &self,
        full: &PriceSeries,
        display: &PriceSeries,
        period: &str,
        raw_history: &[Value],
    ) -> ChatAnswer {
        let summary = market_summary(full, display, period);
        if !self.arbiter.is_configured() {
            return unconfigured_answer(&summary);
        }

        let history = sanitize_history(raw_history);
        match self
            .arbiter
            .answer_chat(&full.symbol, &summary, &history)
            .await
        {
            ArbiterOutcome::Accepted(answer) => answer,
            ArbiterOutcome::Declined(failure) => {
                log_decline("chat", &full.symbol, &failure);
                unavailable_answer(&summary)
            }
        }
    }
}

/// Cache key for a POSTed headline batch: every `title::snippet` joined with
/// `|`, followed by the symbol.
fn news_key(symbol: Option<&str>, items: &[NewsItem]) -> String {
    let joined = items
        .iter()
        .map(|i| format!("{}::{}", i.title, i.snippet.as_deref().unwrap_or("")))
        .collect::<Vec<_>>()
        .join("|");
    fingerprint(&[joined, symbol.unwrap_or("").to_string()])
}

fn log_decline(kind: &str, symbol: &str, failure: &ModelFailure) {
    match failure {
        ModelFailure::MissingCredential => {
            debug!(kind, symbol = %symbol, "no model configured, using heuristic")
        }
        other => warn!(kind, symbol = %symbol, reason = %other, "model declined, using heuristic"),
    }
}
