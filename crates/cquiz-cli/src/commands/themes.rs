//! The `cquiz themes` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

pub fn execute(bank_path: Option<PathBuf>) -> Result<()> {
    let bank = super::load_questions(bank_path.as_deref())?;

    let mut table = Table::new();
    table.set_header(vec!["#", "Theme", "Questions"]);
    for (i, theme) in bank.themes().into_iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(theme),
            Cell::new(bank.count_for(theme)),
        ]);
    }

    println!("{table}");
    Ok(())
}
