use super::Extractor;
use crate::error::Result;
use pulldown_cmark::{CodeBlockKind, Event, Parser as CmarkParser, Tag, TagEnd};

/// Markdown extractor for README files and notes
///
/// Walks the event stream and flattens headings, paragraphs and code blocks
/// into plain text suitable for chunking and embedding.
pub struct MarkdownExtractor;

impl Extractor for MarkdownExtractor {
    fn can_extract(&self, extension: &str) -> bool {
        matches!(extension, "md" | "markdown")
    }

    fn extract(&self, content: &str, _path: &str) -> Result<String> {
        let parser = CmarkParser::new(content);
        let mut text = String::new();
        let mut in_code_block = false;

        for event in parser {
            match event {
                Event::Text(t) => {
                    text.push_str(&t);
                    if !in_code_block {
                        text.push(' ');
                    }
                }
                Event::Code(code) => {
                    text.push_str(&code);
                    text.push(' ');
                }
                Event::Start(Tag::CodeBlock(kind)) => {
                    in_code_block = true;
                    if let CodeBlockKind::Fenced(lang) = kind {
                        if !lang.is_empty() {
                            text.push_str(&lang);
                            text.push('\n');
                        }
                    }
                }
                Event::End(TagEnd::CodeBlock) => {
                    in_code_block = false;
                    text.push('\n');
                }
                Event::Start(Tag::Heading { .. })
                | Event::End(TagEnd::Heading(_))
                | Event::End(TagEnd::Paragraph)
                | Event::End(TagEnd::Item) => {
                    text.push('\n');
                }
                Event::SoftBreak | Event::HardBreak => {
                    text.push('\n');
                }
                _ => {}
            }
        }

        let text = text.trim().to_string();
        if text.is_empty() {
            // Nothing but raw markup (or empty file): fall back to the source text
            Ok(content.to_string())
        } else {
            Ok(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_extractor_can_extract() {
        let extractor = MarkdownExtractor;
        assert!(extractor.can_extract("md"));
        assert!(!extractor.can_extract("txt"));
    }

    #[test]
    fn test_markdown_extractor_flattens_structure() {
        let extractor = MarkdownExtractor;
        let content = r#"
# Title

This is content.

## Subsection

More content with `inline code`.
"#;

        let text = extractor.extract(content, "test.md").unwrap();
        assert!(text.contains("Title"));
        assert!(text.contains("This is content."));
        assert!(text.contains("inline code"));
        assert!(!text.contains('#'));
    }

    #[test]
    fn test_markdown_extractor_keeps_code_blocks() {
        let extractor = MarkdownExtractor;
        let content = "```rust\nfn main() {}\n```\n";

        let text = extractor.extract(content, "test.md").unwrap();
        assert!(text.contains("fn main() {}"));
    }
}
