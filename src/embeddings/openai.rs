use crate::cache::EmbeddingCache;
use crate::embeddings::Embedder;
use crate::error::{PermagentError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Request structure for OpenAI embeddings API
#[derive(Serialize)]
struct EmbeddingRequest {
    model: String,
    input: Vec<String>,
}

/// Response structure from OpenAI embeddings API
#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

/// Individual embedding data in API response
#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// OpenAI embeddings client
///
/// Handles batch splitting, a bounded request timeout, retry with exponential
/// backoff on rate-limit and server errors, and an optional LRU cache keyed
/// by chunk text.
pub struct OpenAIEmbedder {
    client: Client,
    api_key: String,
    model: String,
    batch_size: usize,
    cache: Option<Arc<EmbeddingCache>>,
}

impl OpenAIEmbedder {
    /// Create a new OpenAI embedder.
    ///
    /// `batch_size` is capped at the API limit of 2048 inputs per request.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created (should not happen in
    /// normal operation).
    pub fn new(
        api_key: String,
        model: String,
        batch_size: usize,
        request_timeout: Duration,
        cache: Option<Arc<EmbeddingCache>>,
    ) -> Self {
        let batch_size = batch_size.min(2048);

        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key,
            model,
            batch_size,
            cache,
        }
    }

    /// Single API request for one batch of texts.
    async fn embed_batch_internal(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let request = EmbeddingRequest {
            model: self.model.clone(),
            input: texts,
        };

        let response = self
            .client
            .post("https://api.openai.com/v1/embeddings")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PermagentError::Model("Embeddings request timed out".to_string())
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

        let result: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| PermagentError::Model(format!("Failed to parse response: {}", e)))?;

        Ok(result.data.into_iter().map(|d| d.embedding).collect())
    }

    /// One batch with retry on 429/5xx; other errors return immediately.
    async fn embed_batch_with_retry(
        &self,
        texts: Vec<String>,
        max_retries: usize,
    ) -> Result<Vec<Vec<f32>>> {
        let mut attempt = 0;
        let mut delay = Duration::from_secs(1);

        loop {
            match self.embed_batch_internal(texts.clone()).await {
                Ok(embeddings) => return Ok(embeddings),
                Err(e) if attempt < max_retries => {
                    let msg = e.to_string();
                    let should_retry = msg.contains("429")
                        || msg.contains("500")
                        || msg.contains("502")
                        || msg.contains("503")
                        || msg.contains("504");

                    if should_retry {
                        log::warn!("Retry {}/{} after error: {}", attempt + 1, max_retries, e);
                        tokio::time::sleep(delay).await;
                        delay *= 2;
                        attempt += 1;
                    } else {
                        return Err(e);
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    /// Embed a batch of texts, splitting into API-sized requests.
    ///
    /// Cached texts never hit the API; results come back in input order.
    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        // Partition into cache hits and texts that need an API call
        let mut results: Vec<Option<Vec<f32>>> = vec![None; texts.len()];
        let mut missing: Vec<(usize, String)> = Vec::new();

        for (i, text) in texts.iter().enumerate() {
            match self.cache.as_ref().and_then(|c| c.get(text)) {
                Some(hit) => results[i] = Some(hit),
                None => missing.push((i, text.clone())),
            }
        }

        if !missing.is_empty() {
            log::debug!(
                "Embedding {} texts ({} cache hits)",
                missing.len(),
                texts.len() - missing.len()
            );
        }

        for batch in missing.chunks(self.batch_size) {
            let batch_texts: Vec<String> = batch.iter().map(|(_, t)| t.clone()).collect();
            let embeddings = self.embed_batch_with_retry(batch_texts, 3).await?;

            if embeddings.len() != batch.len() {
                return Err(PermagentError::Model(format!(
                    "OpenAI returned {} embeddings for {} inputs",
                    embeddings.len(),
                    batch.len()
                )));
            }

            for ((i, text), embedding) in batch.iter().zip(embeddings) {
                if let Some(cache) = &self.cache {
                    cache.put(text.clone(), embedding.clone());
                }
                results[*i] = Some(embedding);
            }

            // Rate limiting: small delay between full batches
            if batch.len() == self.batch_size {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }

        Ok(results.into_iter().map(|r| r.expect("all slots filled")).collect())
    }
}
