use super::Extractor;
use crate::error::{PermagentError, Result};
use quick_xml::events::Event;
use quick_xml::Reader;

/// XML extractor
///
/// Collects text nodes and drops markup. Attribute values are ignored.
pub struct XmlExtractor;

impl Extractor for XmlExtractor {
    fn can_extract(&self, extension: &str) -> bool {
        extension == "xml"
    }

    fn extract(&self, content: &str, path: &str) -> Result<String> {
        let mut reader = Reader::from_str(content);

        let mut text = String::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Text(e)) => {
                    let fragment = String::from_utf8_lossy(e.as_ref()).trim().to_string();
                    if !fragment.is_empty() {
                        text.push_str(&fragment);
                        text.push('\n');
                    }
                }
                Ok(Event::CData(e)) => {
                    let fragment = String::from_utf8_lossy(e.as_ref()).trim().to_string();
                    if !fragment.is_empty() {
                        text.push_str(&fragment);
                        text.push('\n');
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(PermagentError::Extract(format!(
                        "XML parse error in {}: {}",
                        path, e
                    )));
                }
            }
            buf.clear();
        }

        let text = text.trim().to_string();
        if text.is_empty() {
            // Element-only document: keep the raw markup so something gets indexed
            Ok(content.to_string())
        } else {
            Ok(text)
        }
    }
}
