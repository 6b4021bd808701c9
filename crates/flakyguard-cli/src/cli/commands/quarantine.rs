use super::{apply_selection, open_store};
use crate::cli::args::QuarantineArgs;
use crate::exit_codes::EXIT_SUCCESS;
use anyhow::Context;
use flakyguard_core::{emit_quarantine, Analysis, GuardConfig};
use std::path::Path;

pub fn run(db: &Path, mut cfg: GuardConfig, args: QuarantineArgs) -> anyhow::Result<i32> {
    apply_selection(&mut cfg, &args.selection)?;

    let store = open_store(db)?;
    let records = Analysis::from_config(&cfg).flag(&store)?;
    store.close()?;

    let artifact = emit_quarantine(&records);
    match &args.out {
        Some(path) => {
            std::fs::write(path, &artifact)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!(
                "Quarantined {} tests -> {}",
                records.len(),
                path.display()
            );
        }
        None => {
            print!("{artifact}");
            eprintln!("Quarantined {} tests", records.len());
        }
    }
    Ok(EXIT_SUCCESS)
}
