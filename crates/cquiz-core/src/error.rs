//! Error types for the quiz engine.
//!
//! `QuestionError` covers content-authoring defects caught when a question is
//! built; `QuizError` covers session operations called at the wrong time.

use thiserror::Error;

use crate::session::SessionState;

/// A question definition that violates the catalogue invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionError {
    /// A choice-type question has no options.
    #[error("question \"{prompt}\" has no options")]
    MissingOptions { prompt: String },

    /// A question that needs accepted answers has none.
    #[error("question \"{prompt}\" has no accepted answers")]
    MissingAnswers { prompt: String },

    /// An accepted answer does not match any option after normalization.
    #[error("answer \"{answer}\" of question \"{prompt}\" is not one of its options")]
    AnswerNotAnOption { prompt: String, answer: String },

    /// Slider bounds are missing, malformed, or out of order.
    #[error("slider question \"{prompt}\" has invalid bounds: {reason}")]
    InvalidSlider { prompt: String, reason: String },

    /// An image-click question lacks an image or click regions.
    #[error("image question \"{prompt}\" is invalid: {reason}")]
    InvalidImage { prompt: String, reason: String },

    /// Fields were supplied that make no sense for the question type.
    #[error("question \"{prompt}\" of type {kind} does not accept {field}")]
    UnexpectedField {
        prompt: String,
        kind: String,
        field: &'static str,
    },
}

/// Errors raised by [`QuizSession`](crate::session::QuizSession) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    /// No question in the catalogue carries the requested theme.
    #[error("no questions available for theme \"{0}\"")]
    EmptyTheme(String),

    /// A session of zero questions was requested.
    #[error("a quiz needs at least one question")]
    EmptySelection,

    /// The operation is not allowed in the session's current state.
    #[error("cannot {operation} while the session is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },
}

impl QuizError {
    /// Returns `true` if picking a different theme or count would avoid the error.
    pub fn is_selection_error(&self) -> bool {
        matches!(self, QuizError::EmptyTheme(_) | QuizError::EmptySelection)
    }
}
