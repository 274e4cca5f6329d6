//! Forensic dump ingestion: decoding, extraction and background loading

mod batch;
mod error;
mod extract;
mod loader;
mod worker;

pub use batch::{collect_paths, ingest_file, ingest_with, BatchOutcome, FileFailure, Step};
pub use error::IngestError;
pub use extract::{
    extract, extract_app_summary, extract_call_records, extract_device_info, extract_messages,
    AppSummary, CallRecord, Extracted,
};
pub use loader::{decode, load_dump, strip_control, unwrap_payload};
pub use worker::{IngestOutcome, IngestProgress, IngestStatus, IngestWorker};
