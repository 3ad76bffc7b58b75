// =============================================================================
// News prompt and reply validation
// =============================================================================
//
// Reply contract: {"bullets": ["..."], "sentiment": "positive|neutral|negative",
// "risk": "..."}. Only an unparseable reply is rejected; individual fields are
// repaired (bullets trimmed and capped at five, unknown sentiment becomes
// neutral, blank risk gets a placeholder).

use serde::Serialize;
use serde_json::{Map, Value};

use crate::llm::{extract_json_object, ModelFailure};
use crate::types::{ChatMessage, NewsDigest, NewsItem, Origin, Sentiment};

pub const SYSTEM_PROMPT: &str = "Output only valid JSON. Avoid advice; keep it concise.";
pub const DEFAULT_BULLET: &str = "No clear summary.";
pub const DEFAULT_RISK: &str = "Consider data quality and recency.";

const MAX_BULLETS: usize = 5;

#[derive(Serialize)]
struct NewsPayload<'a> {
    symbol: Option<&'a str>,
    items: &'a [NewsItem],
}

pub fn build_messages(symbol: Option<&str>, items: &[NewsItem]) -> Vec<ChatMessage> {
    let payload = serde_json::to_string(&NewsPayload { symbol, items })
        .unwrap_or_else(|_| "{}".to_string());
    let prompt = format!(
        "You are a cautious markets assistant. Given recent headlines/snippets, write:\n\
         - 3-5 concise bullets on the key themes and price-relevant info\n\
         - A single short risk note (<= 18 words)\n\
         - Classify overall sentiment as positive, neutral, or negative\n\
         Return STRICT JSON only: {{\"bullets\":[\"...\"],\"sentiment\":\"positive|neutral|negative\",\"risk\":\"...\"}}\n\
         Data: {payload}"
    );
    vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)]
}

pub fn validate_reply(reply: &str) -> Result<NewsDigest, ModelFailure> {
    let obj = extract_json_object(reply).ok_or(ModelFailure::Unparseable)?;
    Ok(repair_object(&obj))
}

fn repair_object(obj: &Map<String, Value>) -> NewsDigest {
    let mut bullets: Vec<String> = obj
        .get("bullets")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .map(|b| match b {
                    Value::String(s) => s.trim().to_string(),
                    other => other.to_string(),
                })
                .filter(|b| !b.is_empty())
                .take(MAX_BULLETS)
                .collect()
        })
        .unwrap_or_default();
    if bullets.is_empty() {
        bullets.push(DEFAULT_BULLET.to_string());
    }

    let sentiment = obj
        .get("sentiment")
        .and_then(Value::as_str)
        .and_then(Sentiment::parse_loose)
        .unwrap_or(Sentiment::Neutral);

    let risk = obj
        .get("risk")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_RISK)
        .to_string();

    NewsDigest {
        bullets,
        sentiment,
        risk,
        origin: Origin::Model,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_reply() {
        let d = validate_reply(
            r#"{"bullets":["Earnings beat","Guidance raised"],"sentiment":"POSITIVE","risk":"Valuation stretched."}"#,
        )
        .unwrap();
        assert_eq!(d.bullets, vec!["Earnings beat", "Guidance raised"]);
        assert_eq!(d.sentiment, Sentiment::Positive);
        assert_eq!(d.risk, "Valuation stretched.");
        assert_eq!(d.origin, Origin::Model);
    }

    #[test]
    fn bullets_capped_at_five() {
        let d = validate_reply(r#"{"bullets":["1","2","3","4","5","6","7"]}"#).unwrap();
        assert_eq!(d.bullets.len(), 5);
        assert_eq!(d.bullets[4], "5");
    }

    #[test]
    fn missing_fields_get_placeholders() {
        let d = validate_reply("{}").unwrap();
        assert_eq!(d.bullets, vec![DEFAULT_BULLET]);
        assert_eq!(d.sentiment, Sentiment::Neutral);
        assert_eq!(d.risk, DEFAULT_RISK);
    }

    #[test]
    fn bullets_not_an_array_are_ignored() {
        let d = validate_reply(r#"{"bullets":"one long string"}"#).unwrap();
        assert_eq!(d.bullets, vec![DEFAULT_BULLET]);
    }

    #[test]
    fn non_string_bullets_are_stringified() {
        let d = validate_reply(r#"{"bullets":[42, "x"]}"#).unwrap();
        assert_eq!(d.bullets, vec!["42", "x"]);
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(validate_reply("no json").unwrap_err(), ModelFailure::Unparseable);
    }

    #[test]
    fn prompt_embeds_items() {
        let items = vec![NewsItem {
            title: "Apple beats".into(),
            snippet: Some("Revenue up".into()),
        }];
        let msgs = build_messages(Some("AAPL"), &items);
        assert!(msgs[1].content.contains(r#""symbol":"AAPL""#));
        assert!(msgs[1].content.contains(r#""title":"Apple beats""#));
        assert!(msgs[1].content.contains(r#"{"bullets":["..."]"#));
    }
}
