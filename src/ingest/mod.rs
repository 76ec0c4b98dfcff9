//! Per-file ingestion pipeline.
//!
//! One invocation per created file: name filter, text extraction and
//! chunking, vector indexing, summarization, upload, then exactly one record
//! in exactly one log. Any phase failure short-circuits the remaining phases
//! and routes to the failure log; filtered files produce no record at all.
//!
//! Known drift, intentionally not papered over: if the process dies after the
//! index insert but before the record append, the chunks stay in the
//! in-memory index with no record in either log. The index does not survive
//! restarts, so the drift is bounded by process lifetime.

pub mod chunker;
pub mod extractors;

pub use chunker::{chunk_text, CHUNK_OVERLAP, CHUNK_SIZE};
pub use extractors::ExtractorRegistry;

use crate::embeddings::Embedder;
use crate::error::{PermagentError, Result};
use crate::index::IndexHandle;
use crate::logbook::{FailureRecord, Logbook, SuccessRecord};
use crate::summarize::Summarizer;
use crate::upload::Uploader;
use std::path::Path;
use std::sync::Arc;

/// Characters of the raw file fed to the summarizer. Fixed, not configurable.
pub const SUMMARY_EXCERPT_CHARS: usize = 3000;

/// Filename suffixes that are never processed: images, archives,
/// executables, binary documents, OS metadata.
const SKIP_SUFFIXES: &[&str] = &[".ds_store", ".png", ".jpg", ".zip", ".exe", ".pdf", ".bin"];

/// Check whether a file should be silently ignored.
///
/// Hidden files (leading dot on the basename) and the suffix denylist are
/// skipped without producing any record. Suffix matching is
/// case-insensitive.
pub fn should_skip(filename: &str) -> bool {
    if filename.starts_with('.') {
        return true;
    }
    let lower = filename.to_lowercase();
    SKIP_SUFFIXES.iter().any(|s| lower.ends_with(s))
}

/// What happened to one file
#[derive(Debug)]
pub enum Outcome {
    /// Matched the name filter; no record produced
    Skipped,
    /// All phases completed; a success record was appended
    Archived(SuccessRecord),
    /// A phase failed; a failure record was appended
    Failed(FailureRecord),
}

/// The per-file orchestration. One instance lives for the life of the
/// watcher; every created file flows through [`Pipeline::process_file`].
pub struct Pipeline {
    extractors: ExtractorRegistry,
    embedder: Arc<dyn Embedder>,
    index: IndexHandle,
    summarizer: Arc<dyn Summarizer>,
    uploader: Arc<dyn Uploader>,
    logbook: Logbook,
}

impl Pipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: IndexHandle,
        summarizer: Arc<dyn Summarizer>,
        uploader: Arc<dyn Uploader>,
        logbook: Logbook,
    ) -> Self {
        Self {
            extractors: ExtractorRegistry::new(),
            embedder,
            index,
            summarizer,
            uploader,
            logbook,
        }
    }

    /// Run the full pipeline for one created file.
    ///
    /// Always returns `Ok` for per-file failures (they are recorded, not
    /// raised); only log-append I/O errors propagate.
    pub async fn process_file(&self, path: &Path) -> Result<Outcome> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        if should_skip(&filename) {
            log::info!("Skipping unsupported file: {}", filename);
            return Ok(Outcome::Skipped);
        }

        log::info!("Processing new file: {}", path.display());

        match self.run_phases(path, &filename).await {
            Ok(record) => {
                self.logbook.append_success(&record)?;
                Ok(Outcome::Archived(record))
            }
            Err(e) if e.is_pipeline_failure() => {
                log::error!("Error processing {}: {}", filename, e);
                let record = FailureRecord::new(&filename, &e.to_string());
                self.logbook.append_failure(&record)?;
                Ok(Outcome::Failed(record))
            }
            Err(e) => Err(e),
        }
    }

    /// Extract, index, summarize, upload. Stops at the first failing phase.
    async fn run_phases(&self, path: &Path, filename: &str) -> Result<SuccessRecord> {
        // Load & chunk
        let raw = std::fs::read(path).map_err(|e| PermagentError::Extract(e.to_string()))?;
        let content = String::from_utf8_lossy(&raw).to_string();

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let text = self.extractors.extract(&content, filename, &extension)?;
        let chunks = chunk_text(&text);

        // Index
        if !chunks.is_empty() {
            let embeddings = self
                .embedder
                .embed_batch(chunks.clone())
                .await
                .map_err(|e| PermagentError::Index(e.to_string()))?;

            let entries: Vec<(String, Vec<f32>)> = chunks.into_iter().zip(embeddings).collect();
            self.index.insert(entries).await?;
        }

        // Summarize the first characters of the raw file, invalid bytes ignored
        let excerpt: String = content.chars().take(SUMMARY_EXCERPT_CHARS).collect();
        let summary = self.summarizer.summarize(&excerpt).await?;
        log::info!("Summary: {}", summary.trim());

        // Upload
        let cid = self.uploader.upload(filename, raw).await?;

        Ok(SuccessRecord::new(filename, &cid, &summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::spawn_index_worker;
    use async_trait::async_trait;
    use std::fs;
    use tempfile::TempDir;

    struct StubEmbedder {
        fail: bool,
    }

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
            if self.fail {
                return Err(PermagentError::Model("embeddings unavailable".to_string()));
            }
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }
    }

    struct StubSummarizer {
        fail: bool,
    }

    #[async_trait]
    impl Summarizer for StubSummarizer {
        async fn summarize(&self, _excerpt: &str) -> Result<String> {
            if self.fail {
                return Err(PermagentError::Model("completion endpoint down".to_string()));
            }
            Ok("A tiny file about hello world".to_string())
        }
    }

    enum StubUploadMode {
        Ok,
        Http500,
        Transport,
    }

    struct StubUploader {
        mode: StubUploadMode,
    }

    #[async_trait]
    impl Uploader for StubUploader {
        async fn upload(&self, _filename: &str, _bytes: Vec<u8>) -> Result<String> {
            match self.mode {
                StubUploadMode::Ok => Ok("bafy123".to_string()),
                StubUploadMode::Http500 => Err(PermagentError::UploadHttp {
                    status: 500,
                    body: "Internal Server Error".to_string(),
                }),
                StubUploadMode::Transport => {
                    Err(PermagentError::UploadTransport("connection refused".to_string()))
                }
            }
        }
    }

    struct TestHarness {
        pipeline: Pipeline,
        index: IndexHandle,
        logbook: Logbook,
        _dir: TempDir,
    }

    fn harness(embed_fail: bool, summarize_fail: bool, upload: StubUploadMode) -> TestHarness {
        let dir = TempDir::new().unwrap();
        let logbook = Logbook::new(
            &dir.path().join("metadata_log.json"),
            &dir.path().join("failed_uploads.json"),
        );
        let index = spawn_index_worker();
        let pipeline = Pipeline::new(
            Arc::new(StubEmbedder { fail: embed_fail }),
            index.clone(),
            Arc::new(StubSummarizer { fail: summarize_fail }),
            Arc::new(StubUploader { mode: upload }),
            logbook.clone(),
        );
        TestHarness {
            pipeline,
            index,
            logbook,
            _dir: dir,
        }
    }

    fn write_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_skip_filter() {
        assert!(should_skip(".DS_Store"));
        assert!(should_skip(".hidden"));
        assert!(should_skip("photo.png"));
        assert!(should_skip("PHOTO.PNG"));
        assert!(should_skip("archive.zip"));
        assert!(should_skip("tool.exe"));
        assert!(should_skip("paper.pdf"));
        assert!(should_skip("blob.bin"));
        assert!(should_skip("image.jpg"));

        assert!(!should_skip("notes.txt"));
        assert!(!should_skip("readme.md"));
        assert!(!should_skip("data.json"));
        // Hidden check applies to the basename, not mid-name dots
        assert!(!should_skip("my.notes.txt"));
    }

    #[tokio::test]
    async fn test_happy_path_appends_success_record() {
        let h = harness(false, false, StubUploadMode::Ok);
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "notes.txt", "hello world");

        let outcome = h.pipeline.process_file(&path).await.unwrap();
        assert!(matches!(outcome, Outcome::Archived(_)));

        let successes = h.logbook.read_success().unwrap();
        assert_eq!(successes.len(), 1);
        assert_eq!(successes[0].filename, "notes.txt");
        assert_eq!(successes[0].cid, "bafy123");
        assert!(!successes[0].summary.is_empty());

        assert!(h.logbook.read_failures().unwrap().is_empty());

        // "hello world" is one chunk
        assert_eq!(h.index.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_skipped_file_produces_no_record() {
        let h = harness(false, false, StubUploadMode::Ok);
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, ".DS_Store", "binary junk");

        let outcome = h.pipeline.process_file(&path).await.unwrap();
        assert!(matches!(outcome, Outcome::Skipped));

        assert!(h.logbook.read_success().unwrap().is_empty());
        assert!(h.logbook.read_failures().unwrap().is_empty());
        assert_eq!(h.index.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_summarizer_failure_goes_to_failure_log() {
        let h = harness(false, true, StubUploadMode::Ok);
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "notes.txt", "hello world");

        let outcome = h.pipeline.process_file(&path).await.unwrap();
        assert!(matches!(outcome, Outcome::Failed(_)));

        // Indexing succeeded, but no success record may exist
        assert_eq!(h.index.len().await.unwrap(), 1);
        assert!(h.logbook.read_success().unwrap().is_empty());

        let failures = h.logbook.read_failures().unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].filename, "notes.txt");
        assert!(failures[0].error.contains("completion endpoint down"));
    }

    #[tokio::test]
    async fn test_upload_500_failure_records_status() {
        let h = harness(false, false, StubUploadMode::Http500);
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "notes.txt", "hello world");

        let outcome = h.pipeline.process_file(&path).await.unwrap();
        assert!(matches!(outcome, Outcome::Failed(_)));

        let failures = h.logbook.read_failures().unwrap();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].error.contains("500"));
        assert!(h.logbook.read_success().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_transport_failure_goes_to_failure_log() {
        let h = harness(false, false, StubUploadMode::Transport);
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "notes.txt", "hello world");

        let outcome = h.pipeline.process_file(&path).await.unwrap();
        assert!(matches!(outcome, Outcome::Failed(_)));

        let failures = h.logbook.read_failures().unwrap();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].error.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_embedder_failure_is_an_index_error() {
        let h = harness(true, false, StubUploadMode::Ok);
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "notes.txt", "hello world");

        let outcome = h.pipeline.process_file(&path).await.unwrap();
        assert!(matches!(outcome, Outcome::Failed(_)));

        let failures = h.logbook.read_failures().unwrap();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].error.contains("Index error"));
        assert_eq!(h.index.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unreadable_file_is_an_extraction_failure() {
        let h = harness(false, false, StubUploadMode::Ok);
        let path = std::path::Path::new("/nonexistent/notes.txt");

        let outcome = h.pipeline.process_file(path).await.unwrap();
        assert!(matches!(outcome, Outcome::Failed(_)));

        let failures = h.logbook.read_failures().unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].filename, "notes.txt");
    }

    #[tokio::test]
    async fn test_empty_file_still_archives() {
        let h = harness(false, false, StubUploadMode::Ok);
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "empty.txt", "");

        let outcome = h.pipeline.process_file(&path).await.unwrap();
        assert!(matches!(outcome, Outcome::Archived(_)));

        // Nothing to index, but the file is summarized and uploaded
        assert_eq!(h.index.len().await.unwrap(), 0);
        assert_eq!(h.logbook.read_success().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_exactly_one_record_per_file() {
        let h = harness(false, true, StubUploadMode::Ok);
        let dir = TempDir::new().unwrap();

        for name in ["a.txt", "b.txt", "c.txt"] {
            let path = write_file(&dir, name, "content");
            h.pipeline.process_file(&path).await.unwrap();
        }

        let successes = h.logbook.read_success().unwrap().len();
        let failures = h.logbook.read_failures().unwrap().len();
        assert_eq!(successes + failures, 3);
    }

    #[tokio::test]
    async fn test_reprocessing_appends_second_record() {
        let h = harness(false, false, StubUploadMode::Ok);
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "notes.txt", "hello world");

        h.pipeline.process_file(&path).await.unwrap();
        h.pipeline.process_file(&path).await.unwrap();

        assert_eq!(h.logbook.read_success().unwrap().len(), 2);
    }
}
