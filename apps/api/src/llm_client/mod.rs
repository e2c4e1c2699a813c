/// Ollama client — the single point of entry for embedding and generation calls.
///
/// ARCHITECTURAL RULE: No other module talks to the model server directly.
/// Callers depend on the `Embedder` / `TextGenerator` traits so tests can swap
/// in fakes; `OllamaClient` is the production implementation of both.
///
/// Calls are single request/response round trips. There is deliberately no
/// retry loop here: a failed call surfaces immediately to the request.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod prompts;

#[derive(Debug, Error)]
pub enum OllamaError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("model server returned an empty embedding")]
    EmptyEmbedding,
}

/// Text → fixed-length vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, OllamaError>;
}

/// Prompt → one complete block of text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, OllamaError>;
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

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaErrorBody {
    error: String,
}

#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    embed_model: String,
    llm_model: String,
}

impl OllamaClient {
    pub fn new(
        base_url: &str,
        embed_model: String,
        llm_model: String,
        timeout: Duration,
    ) -> Result<Self, OllamaError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            embed_model,
            llm_model,
        })
    }

    pub fn embed_model(&self) -> &str {
        &self.embed_model
    }

    pub fn llm_model(&self) -> &str {
        &self.llm_model
    }

    async fn post<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, OllamaError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OllamaErrorBody>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(OllamaError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<R>().await?)
    }
}

#[async_trait]
impl Embedder for OllamaClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, OllamaError> {
        let request = EmbeddingRequest {
            model: &self.embed_model,
            prompt: text,
        };
        let response: EmbeddingResponse = self.post("/api/embeddings", &request).await?;
        if response.embedding.is_empty() {
            return Err(OllamaError::EmptyEmbedding);
        }
        debug!(
            "Embedding call succeeded: model={}, dims={}",
            self.embed_model,
            response.embedding.len()
        );
        Ok(response.embedding)
    }
}

#[async_trait]
impl TextGenerator for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String, OllamaError> {
        let request = GenerateRequest {
            model: &self.llm_model,
            prompt,
            stream: false,
        };
        let response: GenerateResponse = self.post("/api/generate", &request).await?;
        debug!(
            "Generation call succeeded: model={}, eval_count={:?}",
            self.llm_model, response.eval_count
        );
        Ok(response.response)
    }
}
