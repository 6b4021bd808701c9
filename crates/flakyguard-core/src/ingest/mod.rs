//! Report ingestion: one JUnit file per run, appended atomically.

pub mod batch;
pub mod junit;

pub use batch::{ingest_directory, DEFAULT_PATTERN};
pub use junit::{parse_junit, ParsedCase};

use crate::errors::{FlakyError, Result};
use crate::model::{IngestOutcome, TestResult};
use crate::storage::{SourceFile, Store};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::path::Path;

/// `r-<timestamp>` with microsecond resolution.
pub fn generate_run_id(now: DateTime<Utc>) -> String {
    format!("r-{}", now.format("%Y%m%d%H%M%S%6f"))
}

pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Reads, parses and records one report.
///
/// The whole file is parsed before anything is written, so a malformed
/// report leaves the store untouched.
pub fn ingest_report(store: &Store, path: &Path, run_id: Option<&str>) -> Result<IngestOutcome> {
    let now = Utc::now();
    let run_id = match run_id {
        Some(id) => id.to_string(),
        None => generate_run_id(now),
    };
    ingest_report_as(store, path, run_id, now)
}

pub(crate) fn ingest_report_as(
    store: &Store,
    path: &Path,
    run_id: String,
    now: DateTime<Utc>,
) -> Result<IngestOutcome> {
    let bytes = std::fs::read(path).map_err(|e| FlakyError::io(path, e))?;
    let xml = std::str::from_utf8(&bytes)
        .map_err(|e| FlakyError::parse(path, format!("not valid UTF-8: {}", e)))?;
    let cases = parse_junit(xml).map_err(|reason| FlakyError::parse(path, reason))?;

    let results: Vec<TestResult> = cases
        .into_iter()
        .map(|c| TestResult::new(c.name, c.status, c.duration, c.message, run_id.as_str(), now))
        .collect();

    let source = SourceFile {
        digest: sha256_hex(&bytes),
        path: path.display().to_string(),
        run_id: run_id.clone(),
    };
    let recorded = store.append_report(&results, Some(&source))?;
    tracing::info!(path = %path.display(), run_id = %run_id, recorded, "ingested report");

    Ok(IngestOutcome { run_id, recorded })
}
