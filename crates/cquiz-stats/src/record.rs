//! Typed view of one history row.

use serde::{Deserialize, Serialize};

/// Column titles, in file order.
pub const HEADERS: [&str; 7] = [
    "Date",
    "Theme",
    "Correct",
    "Wrong",
    "%",
    "Hints Used",
    "Time(s)",
];

/// One finished quiz as read back from the stats file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: String,
    pub theme: String,
    pub correct: u32,
    pub wrong: u32,
    pub percentage: f64,
    pub hints_used: u32,
    pub elapsed_secs: u64,
}

impl HistoryEntry {
    /// Parse a row of seven fields. Returns `None` for rows with a different
    /// column count or non-numeric counters.
    pub fn from_fields(fields: &[String]) -> Option<Self> {
        let [timestamp, theme, correct, wrong, percentage, hints, elapsed] = fields else {
            return None;
        };
        Some(Self {
            timestamp: timestamp.clone(),
            theme: theme.clone(),
            correct: correct.trim().parse().ok()?,
            wrong: wrong.trim().parse().ok()?,
            percentage: percentage.trim().parse().ok()?,
            hints_used: hints.trim().parse().ok()?,
            elapsed_secs: elapsed.trim().parse().ok()?,
        })
    }
}
