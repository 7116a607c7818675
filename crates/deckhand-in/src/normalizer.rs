//! Response normalization.
//!
//! Backend output goes through three steps before it becomes a
//! [`TranslationResult`]:
//! - the JSON object is located (a single surrounding code fence is unwrapped)
//! - blank values are dropped, then a blank context or command list
//! - the remaining tree is checked against the declared schema
//!
//! Anything that does not conform is a [`DeckhandError::TranslationParse`].
//! Nothing is coerced.

use deckhand_core::{DeckhandError, TranslationResult};
use serde_json::{Map, Value};

/// Parse raw backend text into a result.
pub fn parse_response(raw: &str) -> Result<TranslationResult, DeckhandError> {
    normalize(parse_json(raw)?)
}

/// Parse raw backend text into an untyped JSON tree.
pub fn parse_json(raw: &str) -> Result<Value, DeckhandError> {
    serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| DeckhandError::TranslationParse(format!("response is not JSON: {}", e)))
}

/// Replace `from` with `to` inside every string value of the tree. Object
/// keys are left alone.
pub fn replace_in_strings(value: &mut Value, from: &str, to: &str) {
    match value {
        Value::String(s) if s.contains(from) => *s = s.replace(from, to),
        Value::Array(items) => items.iter_mut().for_each(|v| replace_in_strings(v, from, to)),
        Value::Object(map) => map.values_mut().for_each(|v| replace_in_strings(v, from, to)),
        _ => {}
    }
}

/// Strip blanks and type-check an already parsed response.
pub fn normalize(json: Value) -> Result<TranslationResult, DeckhandError> {
    let mut root = match json {
        Value::Object(root) => root,
        other => {
            return Err(DeckhandError::TranslationParse(format!(
                "expected a JSON object, got {}",
                kind(&other)
            )))
        }
    };

    if let Some(Value::Object(context)) = root.get_mut("context") {
        strip_blank_entries(context);
    }
    for key in ["context", "commands"] {
        if root.get(key).is_some_and(is_blank) {
            root.remove(key);
        }
    }

    serde_json::from_value(Value::Object(root)).map_err(|e| {
        DeckhandError::TranslationParse(format!("response does not match the result schema: {}", e))
    })
}

fn strip_blank_entries(map: &mut Map<String, Value>) {
    map.retain(|_, value| !is_blank(value));
}

/// `null`, `false`, whitespace-only strings and empty arrays or objects.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(_) => false,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Unwrap a response that is entirely one fenced block (```` ```json ... ``` ````).
fn strip_code_fence(raw: &str) -> &str {
    let text = raw.trim();
    let Some(inner) = text.strip_prefix("```").and_then(|t| t.strip_suffix("```")) else {
        return text;
    };
    // Drop the info string ("json") on the opening line.
    match inner.find('\n') {
        Some(newline) => inner[newline + 1..].trim(),
        None => inner.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckhand_core::IndexedBy;
    use serde_json::json;

    #[test]
    fn test_drops_blank_context_values() {
        let result = normalize(json!({
            "context": { "terms": [], "indexed_by": "closed", "tag_ids": null, "creation": "" },
            "commands": ["/close"]
        }))
        .unwrap();

        let context = result.context.unwrap();
        assert_eq!(context.indexed_by, Some(IndexedBy::Closed));
        assert!(context.terms.is_empty());
        assert_eq!(result.commands.unwrap(), vec!["/close"]);
    }

    #[test]
    fn test_drops_blank_sections() {
        let result = normalize(json!({ "context": { "terms": [] }, "commands": [] })).unwrap();
        assert!(result.is_empty());

        let result = normalize(json!({ "context": null, "commands": ["/clear"] })).unwrap();
        assert_eq!(result.context, None);
    }

    #[test]
    fn test_rejects_schema_violations() {
        let cases = [
            json!(["/search x"]),
            json!({ "commands": "/close" }),
            json!({ "context": { "assignee": ["ann"] } }),
            json!({ "context": { "indexed_by": "sideways" } }),
            json!({ "context": { "card_ids": ["12"] } }),
            json!({ "context": { "card_ids": [0] } }),
            json!({ "context": "closed" }),
            json!({ "commands": ["/close"], "reason": "asked" }),
        ];
        for case in cases {
            let err = normalize(case.clone()).unwrap_err();
            assert!(matches!(err, DeckhandError::TranslationParse(_)), "accepted {}", case);
        }
    }

    #[test]
    fn test_parse_response() {
        let result = parse_response(r#"{ "commands": ["/reopen"] }"#).unwrap();
        assert_eq!(result.commands(), ["/reopen"]);

        assert!(matches!(
            parse_response("Sure! Here are your cards."),
            Err(DeckhandError::TranslationParse(_))
        ));
    }

    #[test]
    fn test_replace_in_strings() {
        let mut tree = json!({
            "context": { "assignee_ids": ["<me>", "ann"] },
            "commands": ["/visit /users/<me>"],
            "<me>": 1
        });
        replace_in_strings(&mut tree, "<me>", "id \"quoted\"");

        assert_eq!(tree["context"]["assignee_ids"][0], "id \"quoted\"");
        assert_eq!(tree["commands"][0], "/visit /users/id \"quoted\"");
        assert_eq!(tree["<me>"], 1);
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("  {}  "), "{}");
        // Prose around a fence is not unwrapped.
        assert_eq!(strip_code_fence("see ```{}```"), "see ```{}```");
    }
}
