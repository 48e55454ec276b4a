//! The `cquiz validate` command.

use std::path::PathBuf;

use anyhow::Result;

use cquiz_core::bank::QuestionBank;
use cquiz_core::parser::{self, BankFile, ValidationWarning};

use crate::config::load_config_from;

pub fn execute(bank_path: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let count = config.default_question_count;

    let mut total_warnings = 0;

    match bank_path {
        Some(path) => {
            let files = if path.is_dir() {
                parser::load_bank_directory(&path)?
            } else {
                vec![parser::parse_bank(&path)?]
            };

            for file in &files {
                let BankFile { name, bank, .. } = file;
                println!("Bank: {} ({} questions)", name, bank.len());
                let warnings = parser::validate_bank(bank, file.path.parent(), count);
                print_warnings(&warnings);
                total_warnings += warnings.len();
            }
        }
        None => {
            let bank = QuestionBank::builtin();
            println!("Bank: built-in ({} questions)", bank.len());
            let warnings = parser::validate_bank(&bank, None, count);
            print_warnings(&warnings);
            total_warnings += warnings.len();
        }
    }

    if total_warnings == 0 {
        println!("All banks valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}

fn print_warnings(warnings: &[ValidationWarning]) {
    for w in warnings {
        let prefix = w
            .prompt
            .as_ref()
            .map(|p| format!("  [{p}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }
}
