use super::search::page_number;
use super::{load_engine, print_json};
use casefile_core::{EngineConfig, SearchEngine};
use serde_json::{json, Value};
use std::path::PathBuf;

/// Lists page `page` (1-based) of messages, newest first.
pub fn execute(engine: &SearchEngine, page: usize, page_size: usize) -> anyhow::Result<Value> {
    anyhow::ensure!(page_size > 0, "page size must be positive");
    let offset = page.saturating_sub(1).saturating_mul(page_size);
    let listing = engine.list_messages(offset, Some(page_size))?;
    Ok(json!({
        "total": listing.total,
        "page": page_number(&listing),
        "page_size": page_size,
        "total_pages": listing.total_pages(),
        "messages": listing.items,
    }))
}

pub fn run(
    config: EngineConfig,
    data: &[PathBuf],
    page: usize,
    page_size: usize,
) -> anyhow::Result<()> {
    let (engine, _) = load_engine(config, data)?;
    print_json(&execute(&engine, page, page_size)?)
}
