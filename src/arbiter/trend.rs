// =============================================================================
// Trend prompt and reply validation
// =============================================================================
//
// Reply contract: {"label": "Bullish"|"Bearish"|"Neutral", "confidence": 0-100,
// "reasoning": "..."}.
//
//   label       case-insensitive; anything else rejects the whole reply
//   confidence  integer or integer string, truncated and clamped into 0..=100;
//               0 when absent, any other value rejects the reply
//   reasoning   placeholder when absent or blank

use serde_json::{Map, Value};

use crate::llm::{extract_json_object, ModelFailure};
use crate::signals::TrendFeatures;
use crate::types::{ChatMessage, Origin, TrendLabel, TrendVerdict};

pub const SYSTEM_PROMPT: &str = "You are a precise classifier. Output only valid JSON.";
pub const DEFAULT_REASONING: &str = "LLM analysis.";

pub fn build_messages(features: &TrendFeatures) -> Vec<ChatMessage> {
    let payload = serde_json::to_string(features).unwrap_or_else(|_| "{}".to_string());
    let prompt = format!(
        "You are given technical features for a stock's recent history.\n\
         Classify the CURRENT trend as one of exactly: Bullish, Bearish, or Neutral.\n\
         Use ONLY the provided features; do not assume future events or news.\n\
         Return STRICT JSON with keys: label (Bullish|Bearish|Neutral), confidence (0-100 int), reasoning (short, <= 20 words).\n\
         JSON only, no extra text.\n\
         Features: {payload}"
    );
    vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)]
}

pub fn validate_reply(reply: &str) -> Result<TrendVerdict, ModelFailure> {
    let obj = extract_json_object(reply).ok_or(ModelFailure::Unparseable)?;
    validate_object(&obj)
}

fn validate_object(obj: &Map<String, Value>) -> Result<TrendVerdict, ModelFailure> {
    let raw_label = match obj.get("label") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    };
    let label =
        TrendLabel::parse_loose(&raw_label).ok_or_else(|| ModelFailure::InvalidLabel(raw_label))?;

    let confidence = coerce_confidence(obj.get("confidence"))?;

    let reasoning = obj
        .get("reasoning")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_REASONING)
        .to_string();

    Ok(TrendVerdict {
        label,
        confidence,
        reasoning,
        origin: Origin::Model,
    })
}

/// Integer in `0..=100` from a JSON number or integer string. Fractions are
/// truncated toward zero. A missing value is 0; strings that are not integers
/// and non-numeric types are rejected.
pub fn coerce_confidence(value: Option<&Value>) -> Result<u8, ModelFailure> {
    let raw = match value {
        None => return Ok(0),
        Some(Value::Number(n)) => n.as_f64().map(f64::trunc),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok().map(|v| v as f64),
        Some(_) => None,
    };
    match raw {
        Some(v) if v.is_finite() => Ok(v.clamp(0.0, 100.0) as u8),
        _ => Err(ModelFailure::InvalidConfidence(
            value.map(Value::to_string).unwrap_or_default(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn confidence_is_truncated_and_clamped() {
        assert_eq!(coerce_confidence(Some(&json!(-5))), Ok(0));
        assert_eq!(coerce_confidence(Some(&json!(500))), Ok(100));
        assert_eq!(coerce_confidence(Some(&json!(42))), Ok(42));
        assert_eq!(coerce_confidence(Some(&json!(66.6))), Ok(66));
        assert_eq!(coerce_confidence(Some(&json!(" 73 "))), Ok(73));
        assert_eq!(coerce_confidence(Some(&json!(1e300))), Ok(100));
        assert_eq!(coerce_confidence(None), Ok(0));
    }

    #[test]
    fn non_integer_confidence_is_rejected() {
        for bad in [json!("high"), json!("80%"), json!("66.6"), json!(true), json!({}), json!(null)] {
            assert!(
                matches!(coerce_confidence(Some(&bad)), Err(ModelFailure::InvalidConfidence(_))),
                "{bad} should be rejected"
            );
        }
        let err = validate_reply(r#"{"label":"Bullish","confidence":"very high","reasoning":"x"}"#)
            .unwrap_err();
        assert_eq!(err, ModelFailure::InvalidConfidence("\"very high\"".into()));
    }

    #[test]
    fn out_of_range_confidence_still_accepted() {
        let v = validate_reply(r#"{"label":"Bearish","confidence":500,"reasoning":"x"}"#).unwrap();
        assert_eq!(v.confidence, 100);
        let v = validate_reply(r#"{"label":"Bearish","confidence":-5,"reasoning":"x"}"#).unwrap();
        assert_eq!(v.confidence, 0);
    }

    #[test]
    fn unknown_label_is_rejected() {
        let err = validate_reply(r#"{"label":"Sideways","confidence":50}"#).unwrap_err();
        assert_eq!(err, ModelFailure::InvalidLabel("Sideways".into()));
    }

    #[test]
    fn missing_or_non_string_label_is_rejected() {
        assert!(matches!(
            validate_reply(r#"{"confidence":50}"#),
            Err(ModelFailure::InvalidLabel(_))
        ));
        assert!(matches!(
            validate_reply(r#"{"label":1,"confidence":50}"#),
            Err(ModelFailure::InvalidLabel(_))
        ));
    }

    #[test]
    fn label_case_is_normalised() {
        let v = validate_reply(r#"{"label":"  nEuTrAl ","confidence":10}"#).unwrap();
        assert_eq!(v.label, TrendLabel::Neutral);
        assert_eq!(v.reasoning, DEFAULT_REASONING);
        assert_eq!(v.origin, Origin::Model);
    }

    #[test]
    fn prose_wrapped_reply_is_parsed() {
        let reply = "Here is my answer: {\"label\": \"Bullish\", \"confidence\": 77, \"reasoning\": \"Higher highs.\"} Thanks";
        let v = validate_reply(reply).unwrap();
        assert_eq!(v.label, TrendLabel::Bullish);
        assert_eq!(v.reasoning, "Higher highs.");
    }

    #[test]
    fn garbage_is_unparseable() {
        assert_eq!(validate_reply("I think it's bullish").unwrap_err(), ModelFailure::Unparseable);
    }

    #[test]
    fn prompt_lists_allowed_labels() {
        let msgs = build_messages(&TrendFeatures::extract(&[1.0, 2.0, 3.0]));
        assert_eq!(msgs[0].content, SYSTEM_PROMPT);
        assert!(msgs[1].content.contains("Bullish|Bearish|Neutral"));
        assert!(msgs[1].content.contains("Features: {"));
    }
}
