use super::open_store;
use crate::exit_codes::EXIT_SUCCESS;
use flakyguard_core::report::console;
use std::path::Path;

pub fn run(db: &Path) -> anyhow::Result<i32> {
    let store = open_store(db)?;
    let stats = store.stats()?;
    store.close()?;
    println!("{}", console::format_stats(&stats));
    Ok(EXIT_SUCCESS)
}
