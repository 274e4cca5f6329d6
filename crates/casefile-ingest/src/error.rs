//! Ingestion error types

use std::path::PathBuf;
use thiserror::Error;

/// Why a single dump file could not be ingested
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0} is empty")]
    Empty(PathBuf),
}

impl IngestError {
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Io { path, .. } | Self::Json { path, .. } | Self::Empty(path) => path,
        }
    }
}
