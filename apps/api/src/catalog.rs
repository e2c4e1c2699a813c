//! Fund catalog source.
//!
//! The catalog is a static JSON array of funds with precomputed embeddings. It is
//! reloaded wholesale on every request and handed to the ranker as a plain slice;
//! nothing is cached in-process.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::models::Fund;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("catalog {} is not a JSON array of funds: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Anything that can produce the full fund catalog on demand.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn load(&self) -> Result<Vec<Fund>, CatalogError>;
}

/// Reads the catalog from a JSON file on every call.
pub struct JsonFileCatalog {
    path: PathBuf,
}

impl JsonFileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl CatalogSource for JsonFileCatalog {
    async fn load(&self) -> Result<Vec<Fund>, CatalogError> {
        let raw = tokio::fs::read(&self.path)
            .await
            .map_err(|source| CatalogError::Io {
                path: self.path.clone(),
                source,
            })?;

        let funds: Vec<Fund> =
            serde_json::from_slice(&raw).map_err(|source| CatalogError::Parse {
                path: self.path.clone(),
                source,
            })?;

        debug!("Loaded {} funds from {}", funds.len(), self.path.display());
        Ok(funds)
    }
}
