//! Fixed-size overlapping text windows for indexing.

/// Chunk window size, in characters. Fixed, not configurable.
pub const CHUNK_SIZE: usize = 1000;

/// Overlap between consecutive chunks, in characters. Fixed, not configurable.
pub const CHUNK_OVERLAP: usize = 100;

/// Split text into fixed-size overlapping chunks.
///
/// Sizes are counted in characters, not bytes, so multi-byte UTF-8 content
/// never gets sliced mid-character. Whitespace-only input yields no chunks.
pub fn chunk_text(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    // Byte offset of every char boundary, plus the end of the string, so
    // char-indexed windows map onto valid slice ranges.
    let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    boundaries.push(text.len());
    let char_count = boundaries.len() - 1;

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < char_count {
        let end = (start + CHUNK_SIZE).min(char_count);
        let chunk = text[boundaries[start]..boundaries[end]].trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }

        if end == char_count {
            break;
        }
        start = end - CHUNK_OVERLAP;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_empty_text() {
        assert!(chunk_text("").is_empty());
        assert!(chunk_text("   \n  ").is_empty());
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        let chunks = chunk_text("hello world");
        assert_eq!(chunks, vec!["hello world".to_string()]);
    }

    #[test]
    fn test_long_text_chunks_with_overlap() {
        let text: String = (0..2500).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let chunks = chunk_text(&text);

        // Windows start at 0, 900, 1800
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), CHUNK_SIZE);
        assert_eq!(chunks[1].chars().count(), CHUNK_SIZE);
        assert_eq!(chunks[2].chars().count(), 700);

        // The last CHUNK_OVERLAP chars of one window open the next
        let tail: String = chunks[0].chars().skip(CHUNK_SIZE - CHUNK_OVERLAP).collect();
        let head: String = chunks[1].chars().take(CHUNK_OVERLAP).collect();
        assert_eq!(tail, head);
    }

    #[test]
    fn test_exact_chunk_size_is_one_chunk() {
        let text = "x".repeat(CHUNK_SIZE);
        let chunks = chunk_text(&text);
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn test_multibyte_text_does_not_split_characters() {
        // 3-byte chars; byte-indexed windows would panic on these
        let text = "日本語のテキスト".repeat(200);
        let chunks = chunk_text(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= CHUNK_SIZE);
        }
    }
}
