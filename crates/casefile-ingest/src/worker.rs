//! Background ingestion: batch ingestion on a worker thread, one load at the end

use crate::batch::{collect_paths, ingest_with, FileFailure, Step};
use crate::extract::{AppSummary, CallRecord};
use casefile_core::{LoadReport, SearchEngine};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestStatus {
    Queued,
    Running,
    Loading,
    Completed,
    Cancelled,
    Failed,
}

impl IngestStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

/// Snapshot of a worker's progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestProgress {
    pub task_id: String,
    pub status: IngestStatus,
    pub total: usize,
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub current_file: Option<String>,
    pub error: Option<String>,
}

/// What a completed ingestion produced
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub report: LoadReport,
    pub device_info: BTreeMap<String, String>,
    pub app_summary: Vec<AppSummary>,
    pub call_records: Vec<CallRecord>,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<FileFailure>,
}

struct Control {
    cancelled: AtomicBool,
    progress: Mutex<IngestProgress>,
}

impl Control {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    fn update(&self, f: impl FnOnce(&mut IngestProgress)) {
        f(&mut self.progress.lock());
    }
}

/// Handle to an ingestion running on its own thread.
///
/// The engine keeps serving its previous corpus until the worker finishes;
/// a cancelled worker never touches the engine.
pub struct IngestWorker {
    control: Arc<Control>,
    handle: Option<JoinHandle<Option<IngestOutcome>>>,
}

impl IngestWorker {
    pub fn spawn(engine: Arc<SearchEngine>, inputs: Vec<PathBuf>) -> Self {
        let task_id = Uuid::new_v4().to_string();
        let control = Arc::new(Control {
            cancelled: AtomicBool::new(false),
            progress: Mutex::new(IngestProgress {
                task_id: task_id.clone(),
                status: IngestStatus::Queued,
                total: 0,
                processed: 0,
                succeeded: 0,
                failed: 0,
                current_file: None,
                error: None,
            }),
        });

        let worker_control = Arc::clone(&control);
        let handle = std::thread::Builder::new()
            .name(format!("ingest-{}", &task_id[..8]))
            .spawn(move || run(&engine, &inputs, &worker_control));

        let handle = match handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::error!(task_id = %task_id, error = %e, "failed to start ingestion thread");
                control.update(|p| {
                    p.status = IngestStatus::Failed;
                    p.error = Some(e.to_string());
                });
                None
            }
        };

        Self { control, handle }
    }

    pub fn task_id(&self) -> String {
        self.control.progress.lock().task_id.clone()
    }

    pub fn progress(&self) -> IngestProgress {
        self.control.progress.lock().clone()
    }

    /// Asks the worker to stop before its next file.
    pub fn cancel(&self) {
        self.control.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Waits for the worker. `None` if it was cancelled or failed.
    pub fn join(mut self) -> Option<IngestOutcome> {
        let handle = self.handle.take()?;
        match handle.join() {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::error!("ingestion thread panicked");
                self.control.update(|p| {
                    p.status = IngestStatus::Failed;
                    p.error = Some("ingestion thread panicked".to_string());
                });
                None
            }
        }
    }
}

fn run(engine: &SearchEngine, inputs: &[PathBuf], control: &Control) -> Option<IngestOutcome> {
    let paths = collect_paths(inputs);
    control.update(|p| {
        p.status = IngestStatus::Running;
        p.total = paths.len();
    });
    tracing::info!(files = paths.len(), "ingestion started");

    let batch = ingest_with(&paths, |step| {
        match step {
            Step::Starting(path) => {
                if control.is_cancelled() {
                    return ControlFlow::Break(());
                }
                control.update(|p| p.current_file = Some(path.display().to_string()));
            }
            Step::Finished(batch) => control.update(|p| {
                p.processed = batch.total();
                p.succeeded = batch.succeeded;
                p.failed = batch.failed;
            }),
        }
        ControlFlow::Continue(())
    });

    let batch = match batch {
        Some(batch) if !control.is_cancelled() => batch,
        _ => {
            let processed = control.progress.lock().processed;
            tracing::info!(processed, "ingestion cancelled");
            control.update(|p| {
                p.status = IngestStatus::Cancelled;
                p.current_file = None;
            });
            return None;
        }
    };

    control.update(|p| {
        p.status = IngestStatus::Loading;
        p.current_file = None;
    });
    let report = engine.load(&batch.records);
    control.update(|p| p.status = IngestStatus::Completed);
    tracing::info!(
        succeeded = batch.succeeded,
        failed = batch.failed,
        documents = report.documents,
        apps = batch.app_summary.len(),
        calls = batch.call_records.len(),
        "ingestion completed"
    );

    Some(IngestOutcome {
        report,
        device_info: batch.device_info,
        app_summary: batch.app_summary,
        call_records: batch.call_records,
        succeeded: batch.succeeded,
        failed: batch.failed,
        failures: batch.failures,
    })
}
