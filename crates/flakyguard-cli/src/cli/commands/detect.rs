use super::{apply_selection, open_store};
use crate::cli::args::{DetectArgs, OutputFormat};
use crate::exit_codes::EXIT_SUCCESS;
use flakyguard_core::report::{console, json};
use flakyguard_core::{Analysis, GuardConfig};
use std::path::Path;

pub fn run(db: &Path, mut cfg: GuardConfig, args: DetectArgs) -> anyhow::Result<i32> {
    if let Some(rate) = args.ci_cost {
        cfg.cost.ci_rate_per_minute = rate;
    }
    if let Some(minutes) = args.rerun_min {
        cfg.cost.rerun_duration_minutes = minutes;
    }
    apply_selection(&mut cfg, &args.selection)?;

    let store = open_store(db)?;
    let records = Analysis::from_config(&cfg).run(&store)?;
    store.close()?;

    match args.output {
        OutputFormat::Json => println!("{}", json::flaky_json(&records)?),
        OutputFormat::Table => print!("{}", console::format_flaky_table(&records)),
    }
    Ok(EXIT_SUCCESS)
}
