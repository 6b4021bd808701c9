use super::open_store;
use crate::cli::args::IngestArgs;
use crate::exit_codes::{COMMAND_FAILED, EXIT_SUCCESS};
use flakyguard_core::ingest::{ingest_directory, ingest_report};
use std::path::Path;

pub fn run(db: &Path, args: IngestArgs) -> anyhow::Result<i32> {
    let store = open_store(db)?;

    if args.path.is_dir() {
        if args.run_id.is_some() {
            tracing::warn!("--run-id is ignored in directory mode");
        }
        let summary = ingest_directory(&store, &args.path, &args.pattern)?;
        eprintln!(
            "Ingested {} files ({} tests); skipped {} already ingested; {} failed",
            summary.files_ingested,
            summary.tests_recorded,
            summary.files_skipped,
            summary.files_failed
        );
        store.close()?;
        if summary.files_failed > 0 {
            return Ok(COMMAND_FAILED);
        }
        return Ok(EXIT_SUCCESS);
    }

    let outcome = ingest_report(&store, &args.path, args.run_id.as_deref())?;
    eprintln!(
        "Ingested {} test results (run {})",
        outcome.recorded, outcome.run_id
    );
    store.close()?;
    Ok(EXIT_SUCCESS)
}
