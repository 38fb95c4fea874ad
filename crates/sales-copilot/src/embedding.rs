//! Ollama-backed embedding provider.
//!
//! Calls the local Ollama embed endpoint (`POST /api/embed`) with
//! batched input. An unusable model is detected by a probe embed at
//! construction and is fatal at process start, never recovered
//! per-call.
//!
//! # Retry Strategy
//!
//! Transient failures use exponential backoff:
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - other HTTP 4xx → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)

use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use sales_copilot_core::embedding::Embedder;

use crate::config::EmbeddingConfig;

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Embedding provider using a local Ollama instance.
#[derive(Debug)]
pub struct OllamaEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dims: usize,
    batch_size: usize,
    max_retries: u32,
}

impl OllamaEmbedder {
    /// Build the provider and verify the model is loadable.
    ///
    /// Sends a one-text probe embed and checks the returned
    /// dimensionality against the configured `dims`. Any failure here
    /// is an initialization failure for the whole process.
    pub async fn connect(config: &EmbeddingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let embedder = Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            dims: config.dims,
            batch_size: config.batch_size,
            max_retries: config.max_retries,
        };

        info!(model = %embedder.model, "probing embedding model");
        let probe = embedder.encode_batch(&["ping".to_string()]).await?;
        let got = probe.first().map(|v| v.len()).unwrap_or(0);
        if got != config.dims {
            bail!(
                "embedding model '{}' returned {} dimensions, config says {}",
                config.model,
                got,
                config.dims
            );
        }

        Ok(embedder)
    }

    async fn request_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let body = EmbedRequest {
            model: &self.model,
            input: texts,
        };

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            let resp = self
                .client
                .post(format!("{}/api/embed", self.base_url))
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let parsed: EmbedResponse = response.json().await?;
                        if parsed.embeddings.len() != texts.len() {
                            bail!(
                                "embedding count mismatch: sent {} texts, got {} vectors",
                                texts.len(),
                                parsed.embeddings.len()
                            );
                        }
                        return Ok(parsed.embeddings);
                    }

                    if status.as_u16() == 429 || status.is_server_error() {
                        let body_text = response.text().await.unwrap_or_default();
                        last_err =
                            Some(anyhow::anyhow!("Ollama embed error {}: {}", status, body_text));
                        continue;
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    bail!("Ollama embed error {}: {}", status, body_text);
                }
                Err(e) => {
                    last_err = Some(e.into());
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("Embedding failed after retries")))
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dims(&self) -> usize {
        self.dims
    }

    async fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        debug!(count = texts.len(), model = %self.model, "embedding batch");

        // Large inputs go over the wire in batch_size slices.
        let mut vectors = Vec::with_capacity(texts.len());
        for slice in texts.chunks(self.batch_size) {
            vectors.extend(self.request_embeddings(slice).await?);
        }
        Ok(vectors)
    }
}
