pub mod analyze;
pub mod context;
pub mod favorites;
pub mod history;
pub mod messages;
pub mod search;
pub mod stats;
pub mod version;

use anyhow::Context as _;
use casefile_core::{EngineConfig, SearchEngine};
use casefile_ingest::{IngestOutcome, IngestWorker};
use casefile_store::FavoritesStore;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Reads engine configuration, falling back to defaults without a file.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::new());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
}

/// Ingests `data` on a background worker and returns the loaded engine.
pub fn load_engine(
    config: EngineConfig,
    data: &[PathBuf],
) -> anyhow::Result<(Arc<SearchEngine>, IngestOutcome)> {
    let engine = Arc::new(SearchEngine::with_config(config));
    let worker = IngestWorker::spawn(Arc::clone(&engine), data.to_vec());
    tracing::info!(task_id = %worker.task_id(), inputs = data.len(), "loading data");

    let outcome = worker
        .join()
        .ok_or_else(|| anyhow::anyhow!("data loading did not complete"))?;
    if outcome.failed > 0 {
        tracing::warn!(failed = outcome.failed, "some dump files could not be read");
    }
    Ok((engine, outcome))
}

pub fn open_store(path: Option<&Path>) -> anyhow::Result<FavoritesStore> {
    let store = match path {
        Some(path) => FavoritesStore::open(path)?,
        None => FavoritesStore::open_default()?,
    };
    Ok(store)
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
