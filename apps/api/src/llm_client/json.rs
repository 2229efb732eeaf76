//! Locating a JSON object inside free-form model output.
//!
//! Models often wrap their JSON in prose or code fences. We take the span from
//! the first `{` to the last `}` and parse it strictly. This breaks when the
//! output contains a brace outside the intended object (e.g. prose after the
//! JSON that mentions `}`), which is accepted.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::error;

use crate::llm_client::LlmError;

pub fn extract_json(raw: &str) -> Result<Value, LlmError> {
    let span = locate_object(raw).ok_or_else(|| {
        error!("No JSON object in model response: {:?}", raw);
        LlmError::MalformedResponse {
            fragment: raw.to_string(),
        }
    })?;

    serde_json::from_str(span).map_err(|e| {
        error!("Failed to parse model JSON ({e}): {span}");
        LlmError::MalformedResponse {
            fragment: span.to_string(),
        }
    })
}

fn locate_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

// Field decoders for model-produced objects. Small models get the shape
// roughly right; near misses are kept rather than failing the whole reply.

/// `null` becomes `[]`; anything else is passed through as given.
pub fn list_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Value, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => empty_list(),
        other => other,
    })
}

pub fn empty_list() -> Value {
    Value::Array(Vec::new())
}

/// `null` becomes `""`, strings are kept, other scalars and structures are
/// rendered as JSON text.
pub fn text_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(text) => text,
        other => other.to_string(),
    })
}

/// Numeric reading of a score that may have arrived as `85` or `"85"`.
pub fn score_value(score: &Value) -> Option<f64> {
    score
        .as_f64()
        .or_else(|| score.as_str()?.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Loose {
        #[serde(default = "empty_list", deserialize_with = "list_or_empty")]
        items: Value,
        #[serde(default, deserialize_with = "text_or_empty")]
        label: String,
    }

    #[test]
    fn test_lenient_fields_accept_near_misses() {
        let loose: Loose = serde_json::from_value(json!({"items": null, "label": 7})).unwrap();
        assert_eq!(loose.items, json!([]));
        assert_eq!(loose.label, "7");

        let loose: Loose = serde_json::from_value(json!({"items": "one"})).unwrap();
        assert_eq!(loose.items, json!("one"));
        assert_eq!(loose.label, "");

        let loose: Loose = serde_json::from_value(json!({"label": null})).unwrap();
        assert_eq!(loose.items, json!([]));
    }

    #[test]
    fn test_score_value_reads_numbers_and_numeric_strings() {
        assert_eq!(score_value(&json!(72)), Some(72.0));
        assert_eq!(score_value(&json!(" 85 ")), Some(85.0));
        assert_eq!(score_value(&json!("high")), None);
        assert_eq!(score_value(&Value::Null), None);
    }

    #[test]
    fn test_extracts_object_surrounded_by_noise() {
        let value = extract_json("noise{\"a\":1}more noise").unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_no_braces_is_malformed() {
        let err = extract_json("no braces here").unwrap_err();
        assert!(matches!(err, LlmError::MalformedResponse { .. }));
    }

    #[test]
    fn test_code_fenced_output() {
        let raw = "Here you go:\n```json\n{\"matchScore\": 80, \"strengths\": [\"Rust\"]}\n```";
        let value = extract_json(raw).unwrap();
        assert_eq!(value["matchScore"], 80);
    }

    #[test]
    fn test_nested_objects_are_kept_whole() {
        let value = extract_json("{\"outer\": {\"inner\": true}}").unwrap();
        assert_eq!(value["outer"]["inner"], true);
    }

    #[test]
    fn test_closing_brace_before_opening_is_malformed() {
        assert!(extract_json("} then {").is_err());
    }

    #[test]
    fn test_invalid_json_carries_fragment() {
        match extract_json("prefix {not: json} suffix") {
            Err(LlmError::MalformedResponse { fragment }) => {
                assert_eq!(fragment, "{not: json}");
            }
            other => panic!("expected MalformedResponse, got {other:?}"),
        }
    }

    #[test]
    fn test_trailing_prose_with_brace_breaks_heuristic() {
        // documented limitation of first/last brace slicing
        assert!(extract_json("{\"a\": 1} and a stray }").is_err());
    }
}
