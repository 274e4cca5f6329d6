use super::{open_store, print_json};
use casefile_store::FavoritesStore;
use serde_json::{json, Value};
use std::path::Path;

pub fn execute(store: &mut FavoritesStore, clear: bool) -> anyhow::Result<Value> {
    if clear {
        store.clear_history()?;
        return Ok(json!({ "status": "cleared" }));
    }
    Ok(json!({ "search_history": store.history() }))
}

pub fn run(favorites_file: Option<&Path>, clear: bool) -> anyhow::Result<()> {
    let mut store = open_store(favorites_file)?;
    print_json(&execute(&mut store, clear)?)
}
