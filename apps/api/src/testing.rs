//! In-process collaborators for unit tests. Each fake counts its calls so tests can
//! assert that a code path never reached the model server.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::catalog::{CatalogError, CatalogSource};
use crate::config::Config;
use crate::layout::default_page_geometry;
use crate::llm_client::{Embedder, OllamaError, TextGenerator};
use crate::models::Fund;
use crate::state::AppState;

fn api_failure() -> OllamaError {
    OllamaError::Api {
        status: 500,
        message: "model not loaded".to_string(),
    }
}

#[derive(Default)]
pub struct FakeEmbedder {
    vector: Option<Vec<f32>>,
    calls: AtomicUsize,
}

impl FakeEmbedder {
    pub fn returning(vector: Vec<f32>) -> Self {
        Self {
            vector: Some(vector),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, OllamaError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.vector.clone().ok_or_else(api_failure)
    }
}

#[derive(Default)]
pub struct FakeGenerator {
    reply: Option<String>,
    calls: AtomicUsize,
    last_prompt: std::sync::Mutex<Option<String>>,
}

impl FakeGenerator {
    pub fn returning(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().ok().and_then(|p| p.clone())
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, OllamaError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_prompt.lock() {
            *last = Some(prompt.to_string());
        }
        self.reply.clone().ok_or_else(api_failure)
    }
}

pub struct StaticCatalog {
    funds: Vec<Fund>,
    loads: AtomicUsize,
}

impl StaticCatalog {
    pub fn new(funds: Vec<Fund>) -> Self {
        Self {
            funds,
            loads: AtomicUsize::new(0),
        }
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn load(&self) -> Result<Vec<Fund>, CatalogError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.funds.clone())
    }
}

pub fn fund_with_embedding(name: &str, embedding: Vec<f32>) -> Fund {
    Fund {
        fund_name: name.to_string(),
        embedding,
        ..Fund::default()
    }
}

/// A fully populated fund as it would appear in the catalog file.
pub fn sample_fund(name: &str, link: Option<&str>, amount: Option<&str>) -> Fund {
    Fund {
        fund_name: name.to_string(),
        organization: "Creative Europe MEDIA".to_string(),
        description: "Supports European documentary development.".to_string(),
        location: "EU".to_string(),
        status: "Open".to_string(),
        support_type_and_topic: serde_json::from_value(serde_json::json!(
            {"type": "Grant", "topic": "Documentary"}
        ))
        .ok(),
        amount: amount.map(str::to_string),
        link: link.map(str::to_string),
        embedding: vec![1.0, 0.0],
        ..Fund::default()
    }
}

/// Application state wired to in-process collaborators. The header image path does
/// not exist, so exports render with a blank banner.
pub fn test_state(
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn TextGenerator>,
    catalog: Arc<dyn CatalogSource>,
) -> AppState {
    AppState {
        config: Config {
            ollama_url: "http://localhost:11434".to_string(),
            embed_model: "nomic-embed-text".to_string(),
            llm_model: "gemma3:12b".to_string(),
            funds_file: PathBuf::from("funds_with_embeddings.json"),
            header_image: PathBuf::from("/nonexistent/template.png"),
            top_k: 25,
            http_timeout_secs: 120,
            port: 5000,
            rust_log: "info".to_string(),
        },
        embedder,
        generator,
        catalog,
        page_geometry: default_page_geometry(),
    }
}

/// 3x2 RGBA PNG. Alpha per pixel, row-major: 255, 128, 0, 255, 64, 200.
#[rustfmt::skip]
pub const RGBA_PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00, 0x02, 0x08, 0x06, 0x00, 0x00, 0x00, 0x9d, 0x74, 0x66,
    0x1a, 0x00, 0x00, 0x00, 0x1e, 0x49, 0x44, 0x41, 0x54, 0x78, 0xda, 0x63, 0xf8, 0xcf, 0xc0, 0xf0,
    0x1f, 0x08, 0x1b, 0x40, 0x14, 0x03, 0x97, 0x88, 0xdc, 0x7f, 0x0d, 0x23, 0x1b, 0x07, 0xb7, 0x80,
    0xa8, 0x13, 0x00, 0x6f, 0x09, 0x08, 0x46, 0xa9, 0x61, 0xcf, 0xd8, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];

/// 2x1 RGB PNG: one white pixel, one black.
#[rustfmt::skip]
pub const RGB_PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00, 0x00, 0x7b, 0x40, 0xe8,
    0xdd, 0x00, 0x00, 0x00, 0x0f, 0x49, 0x44, 0x41, 0x54, 0x78, 0xda, 0x63, 0xf8, 0xff, 0xff, 0x3f,
    0x03, 0x03, 0x03, 0x00, 0x0e, 0xf8, 0x02, 0xfe, 0x70, 0xf0, 0x3f, 0xb2, 0x00, 0x00, 0x00, 0x00,
    0x49, 0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];
