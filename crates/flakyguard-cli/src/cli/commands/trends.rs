use super::open_store;
use crate::cli::args::{OutputFormat, TrendsArgs};
use crate::exit_codes::EXIT_SUCCESS;
use flakyguard_core::report::{console, json};
use flakyguard_core::trends::analyze_trends;
use std::path::Path;

pub fn run(db: &Path, args: TrendsArgs) -> anyhow::Result<i32> {
    let store = open_store(db)?;
    let history = store.history()?;
    store.close()?;

    let records = analyze_trends(&history, args.days, chrono::Utc::now());
    match args.output {
        OutputFormat::Json => println!("{}", json::trends_json(&records)?),
        OutputFormat::Table => print!("{}", console::format_trend_table(&records, args.days)),
    }
    Ok(EXIT_SUCCESS)
}
