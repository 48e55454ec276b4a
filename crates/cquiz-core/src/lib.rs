//! cquiz-core — Question model, grading, and quiz sessions.
//!
//! This crate holds everything a quiz front-end needs short of I/O: the
//! question catalogue and TOML bank loader, the per-type grader, the session
//! state machine, and the countdown clock.

pub mod bank;
pub mod clock;
pub mod error;
pub mod grader;
pub mod model;
pub mod parser;
pub mod session;
pub mod summary;
