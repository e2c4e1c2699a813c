mod catalog;
mod config;
mod errors;
mod funding;
mod layout;
mod llm_client;
mod matching;
mod models;
mod narrative;
mod render;
mod routes;
mod state;
#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::catalog::JsonFileCatalog;
use crate::config::Config;
use crate::layout::default_page_geometry;
use crate::llm_client::OllamaClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Fundmatch API v{}", env!("CARGO_PKG_VERSION"));

    // One Ollama client serves both embeddings and generation
    let ollama = Arc::new(
        OllamaClient::new(
            &config.ollama_url,
            config.embed_model.clone(),
            config.llm_model.clone(),
            Duration::from_secs(config.http_timeout_secs),
        )
        .context("failed to build Ollama HTTP client")?,
    );
    info!(
        "Ollama client initialized ({}, embed: {}, llm: {})",
        config.ollama_url,
        ollama.embed_model(),
        ollama.llm_model()
    );

    let catalog = JsonFileCatalog::new(config.funds_file.clone());
    info!("Fund catalog: {}", catalog.path().display());

    let state = AppState {
        config: config.clone(),
        embedder: ollama.clone(),
        generator: ollama,
        catalog: Arc::new(catalog),
        page_geometry: default_page_geometry(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
