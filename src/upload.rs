//! Raw file upload to the Lighthouse storage gateway.

use crate::error::{PermagentError, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

/// Seam for storage providers so the pipeline can be exercised without the
/// network.
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Upload raw file bytes; returns the content identifier on success.
    async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<String>;
}

/// Gateway response on HTTP 200. Field names follow the IPFS add API.
#[derive(Debug, Deserialize)]
struct AddResponse {
    #[serde(rename = "Hash")]
    hash: String,
}

/// Lighthouse storage client
///
/// Posts a multipart file body with a bearer credential. Only HTTP 200 counts
/// as success; everything else becomes an upload error carrying the status
/// code so failure records can be asserted on.
pub struct LighthouseUploader {
    client: Client,
    api_url: String,
    api_key: String,
}

impl LighthouseUploader {
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created (should not happen in
    /// normal operation).
    pub fn new(api_url: String, api_key: String, request_timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_url,
            api_key,
        }
    }
}

#[async_trait]
impl Uploader for LighthouseUploader {
    async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<String> {
        let part = Part::bytes(bytes).file_name(filename.to_string());
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PermagentError::UploadTransport("Upload request timed out".to_string())
                } else {
                    PermagentError::UploadTransport(e.to_string())
                }
            })?;

        let status = response.status();

        if status != StatusCode::OK {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            return Err(PermagentError::UploadHttp {
                status: status.as_u16(),
                body,
            });
        }

        let result: AddResponse = response.json().await.map_err(|e| {
            PermagentError::UploadTransport(format!("Failed to parse gateway response: {}", e))
        })?;

        log::info!("Uploaded {} to Lighthouse: {}", filename, result.hash);
        Ok(result.hash)
    }
}
