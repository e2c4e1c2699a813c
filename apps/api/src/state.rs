use std::sync::Arc;

use crate::catalog::CatalogSource;
use crate::config::Config;
use crate::layout::PageGeometry;
use crate::llm_client::{Embedder, TextGenerator};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub embedder: Arc<dyn Embedder>,
    pub generator: Arc<dyn TextGenerator>,
    /// Fund catalog, re-read on every request.
    pub catalog: Arc<dyn CatalogSource>,
    /// Page dimensions and margins for the PDF export.
    pub page_geometry: PageGeometry,
}
