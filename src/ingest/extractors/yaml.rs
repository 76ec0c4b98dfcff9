use super::Extractor;
use crate::error::{PermagentError, Result};
use serde_yaml_ng::Value as YamlValue;

/// YAML extractor for configuration and front-matter style files
pub struct YamlExtractor;

impl Extractor for YamlExtractor {
    fn can_extract(&self, extension: &str) -> bool {
        matches!(extension, "yaml" | "yml")
    }

    fn extract(&self, content: &str, path: &str) -> Result<String> {
        let value: YamlValue = serde_yaml_ng::from_str(content)
            .map_err(|e| PermagentError::Extract(format!("YAML parse error in {}: {}", path, e)))?;

        Ok(yaml_value_to_text(&value))
    }
}

/// Convert YAML value to readable text representation
fn yaml_value_to_text(value: &YamlValue) -> String {
    match value {
        YamlValue::String(s) => s.clone(),
        YamlValue::Number(n) => n.to_string(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Null => "null".to_string(),
        YamlValue::Sequence(seq) => seq
            .iter()
            .map(yaml_value_to_text)
            .collect::<Vec<_>>()
            .join(", "),
        YamlValue::Mapping(map) => map
            .iter()
            .map(|(k, v)| {
                let key = match k {
                    YamlValue::String(s) => s.clone(),
                    YamlValue::Number(n) => n.to_string(),
                    YamlValue::Bool(b) => b.to_string(),
                    _ => "key".to_string(),
                };
                format!("{}: {}", key, yaml_value_to_text(v))
            })
            .collect::<Vec<_>>()
            .join("\n"),
        YamlValue::Tagged(tagged) => yaml_value_to_text(&tagged.value),
    }
}
