//! One-line file summaries via a text-completion endpoint.

use crate::error::{PermagentError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fixed prompt template; the excerpt is appended verbatim.
const SUMMARY_PROMPT: &str = "Summarize this file: ";

/// Seam for summary providers so the pipeline can be exercised without the
/// network.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Produce a summary for a file excerpt. The returned text is recorded
    /// verbatim.
    async fn summarize(&self, excerpt: &str) -> Result<String>;
}

#[derive(Serialize)]
struct CompletionRequest {
    model: String,
    prompt: String,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    text: String,
}

/// OpenAI completions client
///
/// Deterministic sampling (temperature 0) and a bounded request timeout; a
/// hung endpoint surfaces as a model error instead of stalling the pipeline
/// indefinitely.
pub struct OpenAISummarizer {
    client: Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl OpenAISummarizer {
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created (should not happen in
    /// normal operation).
    pub fn new(api_key: String, model: String, max_tokens: u32, request_timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key,
            model,
            max_tokens,
        }
    }
}

#[async_trait]
impl Summarizer for OpenAISummarizer {
    async fn summarize(&self, excerpt: &str) -> Result<String> {
        let request = CompletionRequest {
            model: self.model.clone(),
            prompt: format!("{}{}", SUMMARY_PROMPT, excerpt),
            temperature: 0.0,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post("https://api.openai.com/v1/completions")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PermagentError::Model("Summarization request timed out".to_string())
                } else {
                    PermagentError::Model(format!("Network error: {}", e))
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            return Err(PermagentError::Model(format!(
                "OpenAI API error {}: {}",
                status, body
            )));
        }

        let result: CompletionResponse = response
            .json()
            .await
            .map_err(|e| PermagentError::Model(format!("Failed to parse response: {}", e)))?;

        let choice = result
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| PermagentError::Model("Empty response from OpenAI API".to_string()))?;

        Ok(choice.text)
    }
}
