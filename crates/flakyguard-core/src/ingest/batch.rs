use super::{generate_run_id, ingest_report_as, sha256_hex};
use crate::errors::{FlakyError, Result};
use crate::model::BatchSummary;
use crate::storage::Store;
use chrono::{DateTime, Duration, Utc};
use globset::Glob;
use std::path::{Path, PathBuf};

pub const DEFAULT_PATTERN: &str = "**/*.xml";

/// Ingests every report under `root` matching `pattern`.
///
/// Files already ingested (same content digest) are skipped. A file that
/// cannot be read or parsed is counted in `files_failed` and the batch goes
/// on; store failures abort it.
///
/// Files are taken in sorted path order, and each gets a fresh timestamp
/// strictly later than the previous file's, so results from a later file
/// always sort after those from an earlier one.
pub fn ingest_directory(store: &Store, root: &Path, pattern: &str) -> Result<BatchSummary> {
    let matcher = Glob::new(pattern)?.compile_matcher();
    let mut files = Vec::new();
    collect_files_recursive(root, &mut files)?;
    files.retain(|p| {
        p.strip_prefix(root)
            .map(|rel| matcher.is_match(rel))
            .unwrap_or(false)
    });
    files.sort();

    let started = Utc::now();
    let base_run_id = generate_run_id(started);
    let mut last_ts: Option<DateTime<Utc>> = None;
    let mut summary = BatchSummary::default();

    for (idx, path) in files.iter().enumerate() {
        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable report, skipping");
                summary.files_failed += 1;
                continue;
            }
        };
        if store.has_digest(&sha256_hex(&bytes))? {
            tracing::info!(path = %path.display(), "duplicate report, skipping");
            summary.files_skipped += 1;
            continue;
        }

        let run_id = format!("{}-{:03}", base_run_id, idx);
        let mut now = Utc::now();
        if let Some(prev) = last_ts {
            now = now.max(prev + Duration::microseconds(1));
        }
        last_ts = Some(now);
        match ingest_report_as(store, path, run_id, now) {
            Ok(outcome) => {
                summary.files_ingested += 1;
                summary.tests_recorded += outcome.recorded;
            }
            Err(e @ FlakyError::Store(_)) => return Err(e),
            Err(e) => {
                tracing::warn!(error = %e, "report failed, continuing batch");
                summary.files_failed += 1;
            }
        }
    }
    Ok(summary)
}

fn collect_files_recursive(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(dir).map_err(|e| FlakyError::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| FlakyError::io(dir, e))?;
        let path = entry.path();
        let ft = entry.file_type().map_err(|e| FlakyError::io(&path, e))?;
        if ft.is_dir() {
            collect_files_recursive(&path, out)?;
        } else if ft.is_file() {
            out.push(path);
        }
    }
    Ok(())
}
