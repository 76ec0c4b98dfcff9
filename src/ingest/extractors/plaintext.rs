use super::Extractor;
use crate::error::Result;

/// Plain text fallback extractor
///
/// Passes content through untouched. Used for unknown extensions and as a
/// fallback when structured extractors (JSON, YAML, XML) fail due to syntax
/// errors.
pub struct PlainTextExtractor;

impl Extractor for PlainTextExtractor {
    fn can_extract(&self, _extension: &str) -> bool {
        // This extractor can handle any extension as a fallback
        true
    }

    fn extract(&self, content: &str, _path: &str) -> Result<String> {
        Ok(content.to_string())
    }
}
