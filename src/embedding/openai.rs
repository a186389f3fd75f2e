use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::embedding::Embedder;
use crate::error::AppError;

/// Hosted fallback backend for OpenAI-compatible embedding endpoints.
pub struct OpenAiEmbedder {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingRow>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingRow {
    embedding: Vec<f32>,
}

impl OpenAiEmbedder {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        if api_key.trim().is_empty() {
            return Err(AppError::Internal(
                "openai embedding backend selected but no API key configured".to_string(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(OpenAiEmbedder {
            client,
            endpoint: format!("{}/embeddings", base_url.trim_end_matches('/')),
            model: model.to_string(),
            api_key: api_key.trim().to_string(),
        })
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn name(&self) -> &str {
        "openai"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, AppError> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: text,
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::EmbeddingUnavailable(format!("openai request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::EmbeddingUnavailable(format!(
                "openai returned {}",
                resp.status()
            )));
        }

        let body: EmbeddingResponse = resp
            .json()
            .await
            .map_err(|e| AppError::EmbeddingUnavailable(format!("bad openai response: {e}")))?;

        body.data
            .into_iter()
            .next()
            .map(|row| row.embedding)
            .ok_or_else(|| {
                AppError::EmbeddingUnavailable("openai returned no embedding rows".to_string())
            })
    }
}
