use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a default; a value that is present but unparsable fails startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub ollama_url: String,
    pub embed_model: String,
    pub llm_model: String,
    pub funds_file: PathBuf,
    pub header_image: PathBuf,
    pub top_k: usize,
    pub http_timeout_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            ollama_url: env_or("OLLAMA_URL", "http://localhost:11434"),
            embed_model: env_or("OLLAMA_EMBED_MODEL", "nomic-embed-text"),
            llm_model: env_or("OLLAMA_LLM_MODEL", "gemma3:12b"),
            funds_file: PathBuf::from(env_or("FUNDS_FILE", "funds_with_embeddings.json")),
            header_image: PathBuf::from(env_or("HEADER_IMAGE", "template.png")),
            top_k: env_or("TOP_K", "25")
                .parse::<usize>()
                .context("TOP_K must be a non-negative integer")?,
            http_timeout_secs: env_or("HTTP_TIMEOUT_SECS", "120")
                .parse::<u64>()
                .context("HTTP_TIMEOUT_SECS must be a whole number of seconds")?,
            port: env_or("PORT", "5000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
