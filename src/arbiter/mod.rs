// =============================================================================
// Model Arbiter — asks the language model, trusts nothing it says
// =============================================================================
//
// Each request kind has a prompt builder and a validator. The arbiter sends
// the prompt (once, no retry), validates the reply, and reports either an
// accepted value with `Origin::Model` or the reason it declined. Picking the
// heuristic on a decline is the caller's job; the arbiter holds no mutable
// state.
// =============================================================================

pub mod chat;
pub mod news;
pub mod trend;

use std::sync::Arc;

use crate::llm::{ModelFailure, TextGenerator};
use crate::signals::TrendFeatures;
use crate::types::{ChatAnswer, ChatMessage, NewsDigest, NewsItem, TrendVerdict};

/// Result of one arbitration attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ArbiterOutcome<T> {
    /// Validated model output.
    Accepted(T),
    /// The model path failed; the caller must substitute its heuristic.
    Declined(ModelFailure),
}

impl<T> ArbiterOutcome<T> {
    fn from_result(result: Result<T, ModelFailure>) -> Self {
        match result {
            Ok(value) => Self::Accepted(value),
            Err(failure) => Self::Declined(failure),
        }
    }
}

/// Front door to the optional text generator.
#[derive(Clone, Default)]
pub struct ModelArbiter {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl ModelArbiter {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { generator }
    }

    pub fn is_configured(&self) -> bool {
        self.generator.is_some()
    }

    pub fn model_name(&self) -> Option<&str> {
        self.generator.as_deref().map(|g| g.model())
    }

    async fn ask(&self, messages: &[ChatMessage]) -> Result<String, ModelFailure> {
        let generator = self.generator.as_ref().ok_or(ModelFailure::MissingCredential)?;
        generator.complete(messages).await
    }

    /// Trend classification from the feature snapshot.
    pub async fn classify_trend(&self, features: &TrendFeatures) -> ArbiterOutcome<TrendVerdict> {
        let result = async {
            let messages = trend::build_messages(features);
            let reply = self.ask(&messages).await?;
            trend::validate_reply(&reply)
        }
        .await;
        ArbiterOutcome::from_result(result)
    }

    /// Headline digest for `items`.
    pub async fn summarize_news(
        &self,
        symbol: Option<&str>,
        items: &[NewsItem],
    ) -> ArbiterOutcome<NewsDigest> {
        let result = async {
            let messages = news::build_messages(symbol, items);
            let reply = self.ask(&messages).await?;
            news::validate_reply(&reply)
        }
        .await;
        ArbiterOutcome::from_result(result)
    }

    /// Chat answer grounded in `summary`.
    pub async fn answer_chat(
        &self,
        symbol: &str,
        summary: &str,
        history: &[ChatMessage],
    ) -> ArbiterOutcome<ChatAnswer> {
        let result = async {
            let messages = chat::build_messages(symbol, summary, history);
            let reply = self.ask(&messages).await?;
            chat::validate_reply(&reply)
        }
        .await;
        ArbiterOutcome::from_result(result)
    }
}
