use super::{load_engine, open_store, print_json};
use casefile_core::{DocType, EngineConfig, SearchEngine};
use casefile_store::FavoritesStore;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

/// Lists favorites; with an engine, resolves them to their documents.
pub fn list(store: &FavoritesStore, engine: Option<&SearchEngine>) -> anyhow::Result<Value> {
    let Some(engine) = engine else {
        return Ok(json!({ "favorites": store.list() }));
    };
    let (resolved, not_found) = engine.resolve_favorites(store.list())?;
    Ok(json!({
        "favorites": resolved,
        "total": resolved.len(),
        "not_found": not_found,
    }))
}

pub fn add(
    store: &mut FavoritesStore,
    doc_type: DocType,
    id: &str,
    query: &str,
) -> anyhow::Result<Value> {
    anyhow::ensure!(!id.trim().is_empty(), "document id is required");
    let created = store.add(doc_type, id, query)?;
    Ok(json!({ "status": if created { "added" } else { "updated" } }))
}

pub fn remove(store: &mut FavoritesStore, doc_type: DocType, id: &str) -> anyhow::Result<Value> {
    if !store.remove(doc_type, id)? {
        anyhow::bail!("{doc_type} {id} is not a favorite");
    }
    Ok(json!({ "status": "removed" }))
}

pub fn run_list(
    config: EngineConfig,
    favorites_file: Option<&Path>,
    data: &[PathBuf],
) -> anyhow::Result<()> {
    let store = open_store(favorites_file)?;
    if data.is_empty() {
        return print_json(&list(&store, None)?);
    }
    let (engine, _) = load_engine(config, data)?;
    print_json(&list(&store, Some(&engine))?)
}

pub fn run_add(
    favorites_file: Option<&Path>,
    doc_type: DocType,
    id: &str,
    query: &str,
) -> anyhow::Result<()> {
    let mut store = open_store(favorites_file)?;
    print_json(&add(&mut store, doc_type, id, query)?)
}

pub fn run_remove(favorites_file: Option<&Path>, doc_type: DocType, id: &str) -> anyhow::Result<()> {
    let mut store = open_store(favorites_file)?;
    print_json(&remove(&mut store, doc_type, id)?)
}
