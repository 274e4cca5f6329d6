use super::{load_engine, print_json};
use casefile_core::{EngineConfig, SearchEngine};
use casefile_ingest::IngestOutcome;
use serde_json::{json, Value};
use std::path::PathBuf;

pub fn execute(engine: &SearchEngine, outcome: &IngestOutcome) -> Value {
    let engine_stats = engine.stats();
    json!({
        "counts": {
            "messages": engine_stats.messages,
            "contacts": engine_stats.contacts,
            "social_groups": engine_stats.social_groups,
            "social_contacts": engine_stats.social_contacts,
            "app_summary": outcome.app_summary.len(),
            "call_records": outcome.call_records.len(),
        },
        "engine": engine_stats,
        "ingest": {
            "succeeded": outcome.succeeded,
            "failed": outcome.failed,
            "failures": outcome.failures,
            "skipped_records": outcome.report.skipped,
        },
        "device_info": outcome.device_info,
    })
}

pub fn run(config: EngineConfig, data: &[PathBuf]) -> anyhow::Result<()> {
    let (engine, outcome) = load_engine(config, data)?;
    print_json(&execute(&engine, &outcome))
}
