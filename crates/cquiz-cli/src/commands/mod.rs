pub mod history;
pub mod init;
pub mod play;
pub mod themes;
pub mod validate;

use std::path::Path;

use anyhow::Result;

use cquiz_core::bank::QuestionBank;

/// The bank at `path`, or the built-in catalogue.
pub(crate) fn load_questions(path: Option<&Path>) -> Result<QuestionBank> {
    match path {
        Some(p) => cquiz_core::parser::load_bank(p),
        None => Ok(QuestionBank::builtin()),
    }
}
