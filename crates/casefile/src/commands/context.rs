use super::{load_engine, print_json};
use casefile_core::{EngineConfig, SearchEngine};
use serde_json::{json, Value};
use std::path::PathBuf;

pub fn execute(
    engine: &SearchEngine,
    message_id: &str,
    window: usize,
    query: Option<&str>,
) -> anyhow::Result<Value> {
    anyhow::ensure!(!message_id.trim().is_empty(), "message id is required");

    let mut context = engine.find_conversation_context(message_id, window)?;
    if let Some(query) = query.filter(|q| !q.trim().is_empty()) {
        let highlight_window = engine.config().highlight_window;
        for msg in &mut context {
            msg.highlighted_content =
                Some(engine.highlight_matches(&msg.message.content, query, highlight_window));
        }
    }
    Ok(json!({ "message_id": message_id, "context": context }))
}

pub fn run(
    config: EngineConfig,
    data: &[PathBuf],
    message_id: &str,
    window: usize,
    query: Option<&str>,
) -> anyhow::Result<()> {
    let (engine, _) = load_engine(config, data)?;
    print_json(&execute(&engine, message_id, window, query)?)
}
