pub mod json;
pub mod markdown;
pub mod plaintext;
pub mod xml;
pub mod yaml;

use crate::error::Result;

/// Trait for format-aware text extractors
pub trait Extractor {
    /// Check if this extractor can handle the given file extension
    fn can_extract(&self, extension: &str) -> bool;

    /// Extract readable text from raw file content
    fn extract(&self, content: &str, path: &str) -> Result<String>;
}

/// Extractor registry that selects the appropriate extractor by extension
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn Extractor + Send + Sync>>,
}

impl ExtractorRegistry {
    /// Create a new registry with all built-in extractors
    pub fn new() -> Self {
        let mut registry = Self {
            extractors: Vec::new(),
        };

        registry.register(Box::new(markdown::MarkdownExtractor));
        registry.register(Box::new(json::JsonExtractor));
        registry.register(Box::new(yaml::YamlExtractor));
        registry.register(Box::new(xml::XmlExtractor));

        registry
    }

    /// Register an extractor
    pub fn register(&mut self, extractor: Box<dyn Extractor + Send + Sync>) {
        self.extractors.push(extractor);
    }

    /// Find an extractor that can handle the given extension
    pub fn find_extractor(&self, extension: &str) -> Option<&(dyn Extractor + Send + Sync)> {
        self.extractors
            .iter()
            .find(|e| e.can_extract(extension))
            .map(|e| e.as_ref())
    }

    /// Extract text using the extractor registered for the extension.
    ///
    /// Unknown extensions go straight to plain text. If a structured
    /// extractor fails (e.g. syntax errors), falls back to plain text so the
    /// file can still be indexed.
    pub fn extract(&self, content: &str, path: &str, extension: &str) -> Result<String> {
        let extractor = match self.find_extractor(extension) {
            Some(e) => e,
            None => return plaintext::PlainTextExtractor.extract(content, path),
        };

        match extractor.extract(content, path) {
            Ok(text) => Ok(text),
            Err(e) => {
                log::warn!(
                    "Extractor failed for {} ({}), falling back to plain text: {}",
                    path,
                    extension,
                    e
                );
                plaintext::PlainTextExtractor.extract(content, path)
            }
        }
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extractor_registry() {
        let registry = ExtractorRegistry::new();

        assert!(registry.find_extractor("md").is_some());
        assert!(registry.find_extractor("json").is_some());
        assert!(registry.find_extractor("yaml").is_some());
        assert!(registry.find_extractor("yml").is_some());
        assert!(registry.find_extractor("xml").is_some());
        assert!(registry.find_extractor("txt").is_none());
    }

    #[test]
    fn test_unknown_extension_uses_plaintext() {
        let registry = ExtractorRegistry::new();
        let text = registry.extract("hello world", "notes.txt", "txt").unwrap();
        assert_eq!(text, "hello world");
    }

    #[test]
    fn test_fallback_to_plaintext_on_parse_error() {
        let registry = ExtractorRegistry::new();

        let invalid_json = r#"{"key": "value", invalid}"#;
        let text = registry.extract(invalid_json, "test.json", "json").unwrap();
        assert!(text.contains("invalid"));
    }
}
