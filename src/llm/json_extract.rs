// =============================================================================
// JSON extraction from free-form model text
// =============================================================================
//
// Models asked for "JSON only" still wrap answers in prose or code fences.
// Two attempts are made, in order:
//   1. the whole text parsed strictly;
//   2. the span from the first '{' to the last '}' parsed strictly.
// Only a JSON object counts as success.

use serde_json::{Map, Value};

pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(text.trim()) {
        return Some(obj);
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(Value::Object(obj)) => Some(obj),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_object() {
        let obj = extract_json_object(r#"{"label":"Bullish","confidence":70}"#).unwrap();
        assert_eq!(obj["label"], "Bullish");
    }

    #[test]
    fn object_wrapped_in_prose_and_fences() {
        let text = "Sure! Here you go:\n```json\n{\"label\": \"Bearish\", \"confidence\": 55}\n```\nHope that helps.";
        let obj = extract_json_object(text).unwrap();
        assert_eq!(obj["label"], "Bearish");
        assert_eq!(obj["confidence"], 55);
    }

    #[test]
    fn nested_objects_survive() {
        let text = "x {\"a\": {\"b\": 1}} y";
        let obj = extract_json_object(text).unwrap();
        assert_eq!(obj["a"]["b"], 1);
    }

    #[test]
    fn rejects_non_objects_and_garbage() {
        assert!(extract_json_object("[1,2,3]").is_none());
        assert!(extract_json_object("\"just a string\"").is_none());
        assert!(extract_json_object("no braces here").is_none());
        assert!(extract_json_object("} backwards {").is_none());
        assert!(extract_json_object("{not json}").is_none());
        assert!(extract_json_object("").is_none());
    }

    #[test]
    fn two_objects_in_prose_fail() {
        // First '{' to last '}' spans both objects and is not valid JSON.
        assert!(extract_json_object("{\"a\":1} and {\"b\":2}").is_none());
    }
}
