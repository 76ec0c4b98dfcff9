use super::Extractor;
use crate::error::{PermagentError, Result};
use serde_json::Value as JsonValue;

/// JSON extractor
///
/// Renders scalar values and key paths as readable lines so embedded chunks
/// carry the document's vocabulary rather than its punctuation.
pub struct JsonExtractor;

impl Extractor for JsonExtractor {
    fn can_extract(&self, extension: &str) -> bool {
        extension == "json"
    }

    fn extract(&self, content: &str, path: &str) -> Result<String> {
        let value: JsonValue = serde_json::from_str(content)
            .map_err(|e| PermagentError::Extract(format!("JSON parse error in {}: {}", path, e)))?;

        Ok(json_value_to_text(&value))
    }
}

/// Convert JSON value to readable text representation
fn json_value_to_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Null => "null".to_string(),
        JsonValue::Array(arr) => arr
            .iter()
            .map(json_value_to_text)
            .collect::<Vec<_>>()
            .join(", "),
        JsonValue::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{}: {}", k, json_value_to_text(v)))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_extractor_can_extract() {
        let extractor = JsonExtractor;
        assert!(extractor.can_extract("json"));
        assert!(!extractor.can_extract("xml"));
    }

    #[test]
    fn test_json_extractor_object() {
        let extractor = JsonExtractor;
        let content = r#"{"name": "notes", "count": 3, "tags": ["a", "b"]}"#;

        let text = extractor.extract(content, "test.json").unwrap();
        assert!(text.contains("name: notes"));
        assert!(text.contains("count: 3"));
        assert!(text.contains("a, b"));
    }

    #[test]
    fn test_json_extractor_invalid_errors() {
        let extractor = JsonExtractor;
        let result = extractor.extract("{broken", "test.json");
        assert!(matches!(result, Err(PermagentError::Extract(_))));
    }
}
