//! Batch ingestion of many dump files into one record batch

use crate::error::IngestError;
use crate::extract::{extract, AppSummary, CallRecord, Extracted};
use crate::loader::load_dump;
use casefile_core::RecordBatch;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

const DUMP_EXTENSIONS: &[&str] = &["json", "js"];

/// A file that could not be ingested
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Merged records plus per-file accounting
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub records: RecordBatch,
    pub device_info: BTreeMap<String, String>,
    pub app_summary: Vec<AppSummary>,
    pub call_records: Vec<CallRecord>,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<FileFailure>,
}

impl BatchOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    /// Folds one file's result into the batch.
    pub fn record(&mut self, path: &Path, result: Result<Extracted, IngestError>) {
        match result {
            Ok(extracted) => {
                self.succeeded += 1;
                self.records.extend(extracted.records);
                self.device_info.extend(extracted.device_info);
                self.app_summary.extend(extracted.app_summary);
                self.call_records.extend(extracted.call_records);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to ingest dump");
                self.failed += 1;
                self.failures.push(FileFailure {
                    path: path.to_path_buf(),
                    error: e.to_string(),
                });
            }
        }
    }
}

/// Expands directories (recursively) into their dump files. Plain file
/// paths are kept as given, whatever their extension. Output is sorted
/// within each directory and free of duplicates.
pub fn collect_paths(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            walk(input, &mut paths);
        } else {
            paths.push(input.clone());
        }
    }
    let mut seen = std::collections::HashSet::new();
    paths.retain(|p| seen.insert(p.clone()));
    paths
}

fn walk(dir: &Path, out: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "cannot read directory");
            return;
        }
    };
    let mut children: Vec<PathBuf> = entries.filter_map(|e| e.ok().map(|e| e.path())).collect();
    children.sort();
    for child in children {
        if child.is_dir() {
            walk(&child, out);
        } else if is_dump(&child) {
            out.push(child);
        }
    }
}

fn is_dump(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| DUMP_EXTENSIONS.iter().any(|d| ext.eq_ignore_ascii_case(d)))
}

/// Loads and extracts a single dump.
pub fn ingest_file(path: &Path) -> Result<Extracted, IngestError> {
    let dump = load_dump(path)?;
    let source_file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extracted = extract(&dump, &source_file);
    tracing::debug!(
        path = %path.display(),
        messages = extracted.records.messages.len(),
        contacts = extracted.records.contacts.len(),
        social_groups = extracted.records.social_groups.len(),
        social_contacts = extracted.records.social_contacts.len(),
        "extracted dump"
    );
    Ok(extracted)
}

/// Progress of [`ingest_with`]
#[derive(Debug)]
pub enum Step<'a> {
    /// About to read this file
    Starting(&'a Path),
    /// A file was folded in; the batch so far
    Finished(&'a BatchOutcome),
}

/// Ingests `paths` in order, reporting each step to `observe`.
///
/// Returns `None` as soon as `observe` breaks; the partial batch is dropped.
pub fn ingest_with(
    paths: &[PathBuf],
    mut observe: impl FnMut(Step<'_>) -> ControlFlow<()>,
) -> Option<BatchOutcome> {
    let mut outcome = BatchOutcome::new();
    for path in paths {
        if observe(Step::Starting(path)).is_break() {
            return None;
        }
        let result = ingest_file(path);
        outcome.record(path, result);
        if observe(Step::Finished(&outcome)).is_break() {
            return None;
        }
    }
    tracing::debug!(
        succeeded = outcome.succeeded,
        failed = outcome.failed,
        records = outcome.records.len(),
        "batch ingestion finished"
    );
    Some(outcome)
}
