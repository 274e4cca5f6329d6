use super::{load_engine, print_json};
use casefile_core::{ConversationAnalysis, EngineConfig, SearchEngine, TimeRange};
use std::path::PathBuf;

pub fn execute(
    engine: &SearchEngine,
    query: Option<&str>,
    start: Option<String>,
    end: Option<String>,
) -> anyhow::Result<ConversationAnalysis> {
    let range = (start.is_some() || end.is_some()).then(|| TimeRange::new(start, end));
    Ok(engine.analyze_conversation(query, range.as_ref())?)
}

pub fn run(
    config: EngineConfig,
    data: &[PathBuf],
    query: Option<&str>,
    start: Option<String>,
    end: Option<String>,
) -> anyhow::Result<()> {
    let (engine, _) = load_engine(config, data)?;
    print_json(&execute(&engine, query, start, end)?)
}
