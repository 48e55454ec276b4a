//! Append-only stats file.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};

use cquiz_core::summary::QuizSummary;

use crate::record::HistoryEntry;
use crate::row::{format_row, parse_records};

/// File name used in the home directory when no path is configured.
pub const DEFAULT_FILE_NAME: &str = "quizapp_stats.csv";

#[cfg(windows)]
const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
const LINE_ENDING: &str = "\n";

/// A CSV stats file. The file is created on first append.
#[derive(Debug, Clone)]
pub struct StatsStore {
    path: PathBuf,
}

impl StatsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$HOME/quizapp_stats.csv`, if a home directory is known.
    pub fn default_path() -> Option<PathBuf> {
        std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .map(|home| PathBuf::from(home).join(DEFAULT_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line for `summary`, stamped with the current local time.
    pub fn append(&self, summary: &QuizSummary) -> Result<()> {
        self.append_at(summary, Local::now().naive_local())
    }

    /// Append one line with an explicit timestamp.
    pub fn append_at(&self, summary: &QuizSummary, timestamp: NaiveDateTime) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open stats file {}", self.path.display()))?;

        let line = format_row(summary, timestamp);
        write!(file, "{line}{LINE_ENDING}")
            .with_context(|| format!("failed to write stats file {}", self.path.display()))?;

        tracing::debug!(path = %self.path.display(), "recorded quiz result");
        Ok(())
    }

    /// Append and log any failure instead of returning it. Returns whether
    /// the line was written.
    pub fn append_logged(&self, summary: &QuizSummary) -> bool {
        match self.append(summary) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("could not save quiz result: {e:#}");
                false
            }
        }
    }

    /// Every row in the file, as raw fields. A missing file is an empty history.
    pub fn try_read_history(&self) -> Result<Vec<Vec<String>>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read stats file {}", self.path.display()))?;
        parse_records(&content)
            .with_context(|| format!("failed to parse stats file {}", self.path.display()))
    }

    /// Like [`try_read_history`](Self::try_read_history), but a read failure is
    /// logged and yields an empty history.
    pub fn read_history(&self) -> Vec<Vec<String>> {
        self.try_read_history().unwrap_or_else(|e| {
            tracing::error!("could not read quiz history: {e:#}");
            Vec::new()
        })
    }

    /// Rows that parse as [`HistoryEntry`]; malformed rows are skipped.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.read_history()
            .iter()
            .filter_map(|fields| {
                let entry = HistoryEntry::from_fields(fields);
                if entry.is_none() {
                    tracing::warn!("skipping malformed history row: {}", fields.join(","));
                }
                entry
            })
            .collect()
    }
}
