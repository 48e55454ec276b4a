//! cquiz-stats — Quiz result history.
//!
//! Appends one CSV line per finished quiz to a stats file and reads the
//! history back for display.

pub mod record;
pub mod row;
pub mod store;

pub use record::HistoryEntry;
pub use store::StatsStore;
