use super::args::*;
use anyhow::Context;
use flakyguard_core::config::load_config;
use flakyguard_core::{GuardConfig, Store};
use std::path::Path;

pub mod detect;
pub mod ingest;
pub mod quarantine;
pub mod stats;
pub mod trends;

pub fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let cfg = resolve_config(cli.config.as_deref())?;
    match cli.cmd {
        Command::Ingest(args) => ingest::run(&cli.db, args),
        Command::Detect(args) => detect::run(&cli.db, cfg, args),
        Command::Quarantine(args) => quarantine::run(&cli.db, cfg, args),
        Command::Trends(args) => trends::run(&cli.db, args),
        Command::Stats => stats::run(&cli.db),
    }
}

fn resolve_config(path: Option<&Path>) -> anyhow::Result<GuardConfig> {
    match path {
        Some(p) => {
            let cfg = load_config(p)?;
            tracing::debug!(path = %p.display(), "loaded config");
            Ok(cfg)
        }
        None => Ok(GuardConfig::default()),
    }
}

/// Command-line flags win over the config file.
pub(crate) fn apply_selection(cfg: &mut GuardConfig, sel: &SelectionArgs) -> anyhow::Result<()> {
    if let Some(min_runs) = sel.min_runs {
        cfg.detect.min_runs = min_runs;
    }
    if let Some(threshold) = sel.threshold {
        cfg.detect.threshold = threshold;
    }
    cfg.validate()?;
    Ok(())
}

pub(crate) fn open_store(db: &Path) -> anyhow::Result<Store> {
    Store::open(db).with_context(|| format!("failed to open result store {}", db.display()))
}
