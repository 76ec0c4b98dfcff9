//! Append-only line-delimited JSON logs for upload outcomes.
//!
//! Two files: a success log (one record per archived file) and a failure log
//! (one record per failed file). Records are immutable once written; the
//! files are only ever appended to.

use crate::error::{PermagentError, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Timestamp format shared by both record types: local time, second precision.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Record appended to the success log after a completed upload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuccessRecord {
    pub filename: String,
    pub cid: String,
    pub summary: String,
    pub timestamp: String,
}

impl SuccessRecord {
    pub fn new(filename: &str, cid: &str, summary: &str) -> Self {
        Self {
            filename: filename.to_string(),
            cid: cid.to_string(),
            summary: summary.to_string(),
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// Record appended to the failure log when any pipeline phase fails.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FailureRecord {
    pub filename: String,
    pub error: String,
    pub timestamp: String,
}

impl FailureRecord {
    pub fn new(filename: &str, error: &str) -> Self {
        Self {
            filename: filename.to_string(),
            error: error.to_string(),
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// Handle to the pair of append-only logs.
#[derive(Debug, Clone)]
pub struct Logbook {
    success_path: PathBuf,
    failure_path: PathBuf,
}

impl Logbook {
    pub fn new(success_path: &Path, failure_path: &Path) -> Self {
        Self {
            success_path: success_path.to_path_buf(),
            failure_path: failure_path.to_path_buf(),
        }
    }

    /// Append one success record as a single JSON line. Creates the file if absent.
    pub fn append_success(&self, record: &SuccessRecord) -> Result<()> {
        append_line(&self.success_path, record)
    }

    /// Append one failure record as a single JSON line. Creates the file if absent.
    pub fn append_failure(&self, record: &FailureRecord) -> Result<()> {
        append_line(&self.failure_path, record)
    }

    /// Read all success records, line by line.
    ///
    /// A missing file reads as empty. A malformed line fails the whole read;
    /// there is no per-line recovery.
    pub fn read_success(&self) -> Result<Vec<SuccessRecord>> {
        read_records(&self.success_path)
    }

    /// Read all failure records, line by line. Same contract as [`read_success`].
    ///
    /// [`read_success`]: Logbook::read_success
    pub fn read_failures(&self) -> Result<Vec<FailureRecord>> {
        read_records(&self.failure_path)
    }

    pub fn success_path(&self) -> &Path {
        &self.success_path
    }
}

fn append_line<T: Serialize>(path: &Path, record: &T) -> Result<()> {
    let line = serde_json::to_string(record)
        .map_err(|e| PermagentError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(PermagentError::Io)?;

    writeln!(file, "{}", line).map_err(PermagentError::Io)?;
    Ok(())
}

fn read_records<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = std::fs::File::open(path).map_err(PermagentError::Io)?;
    let reader = BufReader::new(file);

    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(PermagentError::Io)?;
        if line.trim().is_empty() {
            continue;
        }
        let record: T = serde_json::from_str(&line).map_err(|e| {
            PermagentError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("malformed log line in {}: {}", path.display(), e),
            ))
        })?;
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn test_logbook(dir: &TempDir) -> Logbook {
        Logbook::new(
            &dir.path().join("metadata_log.json"),
            &dir.path().join("failed_uploads.json"),
        )
    }

    #[test]
    fn test_append_creates_file_and_round_trips() {
        let dir = TempDir::new().unwrap();
        let logbook = test_logbook(&dir);

        let record = SuccessRecord::new("notes.txt", "bafy123", "A note about things");
        logbook.append_success(&record).unwrap();

        let records = logbook.read_success().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0], record);
    }

    #[test]
    fn test_success_line_has_four_fields() {
        let dir = TempDir::new().unwrap();
        let logbook = test_logbook(&dir);

        logbook
            .append_success(&SuccessRecord::new("a.txt", "bafyabc", "summary"))
            .unwrap();

        let content = fs::read_to_string(dir.path().join("metadata_log.json")).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 1);

        let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 4);
        assert!(obj.contains_key("filename"));
        assert!(obj.contains_key("cid"));
        assert!(obj.contains_key("summary"));
        assert!(obj.contains_key("timestamp"));
    }

    #[test]
    fn test_failure_line_has_three_fields() {
        let dir = TempDir::new().unwrap();
        let logbook = test_logbook(&dir);

        logbook
            .append_failure(&FailureRecord::new("b.txt", "Upload failed: 500"))
            .unwrap();

        let content = fs::read_to_string(dir.path().join("failed_uploads.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(content.lines().next().unwrap()).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert!(obj.contains_key("filename"));
        assert!(obj.contains_key("error"));
        assert!(obj.contains_key("timestamp"));
    }

    #[test]
    fn test_timestamp_format() {
        let record = SuccessRecord::new("a.txt", "cid", "s");
        // YYYY-MM-DD HH:MM:SS
        assert_eq!(record.timestamp.len(), 19);
        assert_eq!(&record.timestamp[4..5], "-");
        assert_eq!(&record.timestamp[10..11], " ");
        assert_eq!(&record.timestamp[13..14], ":");
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let logbook = test_logbook(&dir);
        assert!(logbook.read_success().unwrap().is_empty());
        assert!(logbook.read_failures().unwrap().is_empty());
    }

    #[test]
    fn test_appends_accumulate() {
        let dir = TempDir::new().unwrap();
        let logbook = test_logbook(&dir);

        // Reprocessing the same filename appends a second, independent record
        logbook
            .append_success(&SuccessRecord::new("same.txt", "cid1", "first"))
            .unwrap();
        logbook
            .append_success(&SuccessRecord::new("same.txt", "cid2", "second"))
            .unwrap();

        let records = logbook.read_success().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].cid, "cid1");
        assert_eq!(records[1].cid, "cid2");
    }

    #[test]
    fn test_malformed_line_fails_whole_read() {
        let dir = TempDir::new().unwrap();
        let logbook = test_logbook(&dir);

        logbook
            .append_success(&SuccessRecord::new("ok.txt", "cid", "fine"))
            .unwrap();
        let path = dir.path().join("metadata_log.json");
        let mut content = fs::read_to_string(&path).unwrap();
        content.push_str("{not json\n");
        fs::write(&path, content).unwrap();

        assert!(logbook.read_success().is_err());
    }
}
