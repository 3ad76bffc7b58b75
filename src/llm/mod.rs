// =============================================================================
// Text Generation — seam to the hosted language model
// =============================================================================
//
// Everything the model returns is untrusted text. Callers go through
// `json_extract` and their own field validation before any of it reaches a
// response.

pub mod groq;
pub mod json_extract;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::ChatMessage;

pub use groq::GroqClient;
pub use json_extract::extract_json_object;

/// Why the model path produced nothing usable. Never shown to API callers;
/// the pipeline logs it and serves the heuristic result instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelFailure {
    #[error("no model credential configured")]
    MissingCredential,

    #[error("model request failed: {0}")]
    Transport(String),

    #[error("model service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("model returned an empty completion")]
    EmptyCompletion,

    #[error("model output is not a JSON object")]
    Unparseable,

    #[error("model label {0:?} is not an allowed value")]
    InvalidLabel(String),

    #[error("model confidence {0} is not an integer")]
    InvalidConfidence(String),
}

/// A chat-completion style text generator.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send `messages` and return the generated text of the first choice.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ModelFailure>;

    /// Model identifier, for logs.
    fn model(&self) -> &str;
}

// =============================================================================
// Scripted generator (tests)
// =============================================================================

#[cfg(test)]
pub(crate) mod scripted {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;

    use super::*;

    /// Generator that replays a fixed reply and records what it was sent.
    pub(crate) struct ScriptedGenerator {
        reply: Result<String, ModelFailure>,
        pub(crate) calls: AtomicUsize,
        pub(crate) last_messages: Mutex<Vec<ChatMessage>>,
    }

    impl ScriptedGenerator {
        pub(crate) fn replying(text: &str) -> Self {
            Self::with_result(Ok(text.to_string()))
        }

        pub(crate) fn failing(failure: ModelFailure) -> Self {
            Self::with_result(Err(failure))
        }

        fn with_result(reply: Result<String, ModelFailure>) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
                last_messages: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ModelFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_messages.lock() = messages.to_vec();
            self.reply.clone()
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }
}
