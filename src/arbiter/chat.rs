// =============================================================================
// Chat prompt and reply validation
// =============================================================================

use serde_json::Value;

use crate::llm::ModelFailure;
use crate::types::{ChatAnswer, ChatMessage, Origin, Role};

/// Caller messages forwarded to the model (most recent last).
pub const MAX_HISTORY: usize = 12;

fn system_prompt(summary: &str) -> String {
    format!(
        "You are a helpful stock dashboard assistant. \
         Use ONLY the provided summary as factual context from local CSVs. \
         Be concise, educational, and avoid investment advice. \
         If asked for predictions, discuss scenarios and risks.\n\n\
         ### Data Summary\n{summary}\n"
    )
}

/// Keep only well-formed `{role, content}` objects with a known role.
/// Non-string content is stringified.
pub fn sanitize_history(raw: &[Value]) -> Vec<ChatMessage> {
    raw.iter()
        .filter_map(|m| {
            let obj = m.as_object()?;
            let role: Role = serde_json::from_value(obj.get("role")?.clone()).ok()?;
            let content = match obj.get("content")? {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some(ChatMessage { role, content })
        })
        .collect()
}

pub fn build_messages(symbol: &str, summary: &str, history: &[ChatMessage]) -> Vec<ChatMessage> {
    let start = history.len().saturating_sub(MAX_HISTORY);
    let mut messages = Vec::with_capacity(MAX_HISTORY + 2);
    messages.push(ChatMessage::system(system_prompt(summary)));
    messages.extend_from_slice(&history[start..]);

    if !messages[1..].iter().any(|m| m.role == Role::User) {
        messages.push(ChatMessage::user(format!("Tell me about {symbol}.")));
    }
    messages
}

pub fn validate_reply(reply: &str) -> Result<ChatAnswer, ModelFailure> {
    let answer = reply.trim();
    if answer.is_empty() {
        return Err(ModelFailure::EmptyCompletion);
    }
    Ok(ChatAnswer {
        answer: answer.to_string(),
        origin: Origin::Model,
    })
}
