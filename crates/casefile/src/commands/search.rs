use super::{load_engine, open_store, print_json};
use casefile_core::{EngineConfig, Page, SearchEngine, SearchRequest};
use casefile_store::FavoritesStore;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

pub fn execute(
    engine: &SearchEngine,
    store: &mut FavoritesStore,
    request: &SearchRequest,
    record_history: bool,
) -> anyhow::Result<Value> {
    if record_history {
        store.push_history(&request.query)?;
    }

    let page = if request.query.trim().is_empty() {
        Page::slice(Vec::new(), request.offset, request.limit)
    } else {
        engine.search(request, &store.keys())?
    };

    Ok(json!({
        "query": request.query,
        "strategy": request.strategy,
        "total": page.total,
        "page": page_number(&page),
        "page_size": page.limit,
        "total_pages": page.total_pages(),
        "results": page.items,
    }))
}

/// 1-based page number of a page cut at `offset`
pub(crate) fn page_number<T>(page: &Page<T>) -> usize {
    match page.limit {
        Some(limit) if limit > 0 => page.offset / limit + 1,
        _ => 1,
    }
}

pub fn run(
    config: EngineConfig,
    favorites_file: Option<&Path>,
    data: &[PathBuf],
    request: &SearchRequest,
    record_history: bool,
) -> anyhow::Result<()> {
    let mut store = open_store(favorites_file)?;
    let (engine, _) = load_engine(config, data)?;
    print_json(&execute(&engine, &mut store, request, record_history)?)
}
