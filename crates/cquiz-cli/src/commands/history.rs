//! The `cquiz history` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::load_config_from;
use crate::render::history_table;

pub fn execute(stats_file: Option<PathBuf>, json: bool, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = config
        .stats_store(stats_file.as_deref())
        .context("no stats file configured and no home directory found")?;

    let entries = store.entries();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&entries).context("failed to serialize history")?
        );
        return Ok(());
    }

    if entries.is_empty() {
        println!("No quiz history yet ({}).", store.path().display());
        return Ok(());
    }

    println!("{}", history_table(&entries));
    Ok(())
}
