use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::embedding::Embedder;
use crate::error::AppError;

/// Local embedding backend talking to an Ollama server.
pub struct OllamaEmbedder {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

impl OllamaEmbedder {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(OllamaEmbedder {
            client,
            endpoint: format!("{}/api/embeddings", base_url.trim_end_matches('/')),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, AppError> {
        let request = EmbeddingRequest {
            model: &self.model,
            prompt: text,
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::EmbeddingUnavailable(format!("ollama request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::EmbeddingUnavailable(format!(
                "ollama returned {}",
                resp.status()
            )));
        }

        let body: EmbeddingResponse = resp
            .json()
            .await
            .map_err(|e| AppError::EmbeddingUnavailable(format!("bad ollama response: {e}")))?;

        Ok(body.embedding)
    }
}
