use thiserror::Error;

/// Main error type for Permagent
#[derive(Error, Debug)]
pub enum PermagentError {
    /// Text extraction / chunking errors
    #[error("Extraction error: {0}")]
    Extract(String),

    /// Vector index errors (embedding or insert)
    #[error("Index error: {0}")]
    Index(String),

    /// Language-model call errors (summarization, embeddings API)
    #[error("Model error: {0}")]
    Model(String),

    /// Storage gateway returned a non-200 status
    #[error("Upload failed: {status} - {body}")]
    UploadHttp { status: u16, body: String },

    /// Storage gateway unreachable (connect, TLS, timeout)
    #[error("Upload transport error: {0}")]
    UploadTransport(String),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PermagentError {
    /// True for the error kinds the pipeline converts into a FailureRecord
    /// (everything except configuration mistakes, which abort startup).
    pub fn is_pipeline_failure(&self) -> bool {
        !matches!(self, PermagentError::Config(_))
    }
}

/// Convenient Result type using PermagentError
pub type Result<T> = std::result::Result<T, PermagentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PermagentError::Extract("bad bytes".to_string());
        assert!(err.to_string().contains("Extraction error"));
        assert!(err.to_string().contains("bad bytes"));
    }

    #[test]
    fn test_upload_http_display_contains_status() {
        let err = PermagentError::UploadHttp {
            status: 500,
            body: "Internal Server Error".to_string(),
        };
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("Upload failed"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PermagentError = io_err.into();
        assert!(matches!(err, PermagentError::Io(_)));
    }

    #[test]
    fn test_pipeline_failure_classification() {
        assert!(PermagentError::Model("timeout".into()).is_pipeline_failure());
        assert!(PermagentError::UploadTransport("refused".into()).is_pipeline_failure());
        assert!(!PermagentError::Config("missing key".into()).is_pipeline_failure());
    }
}
