//! End-of-quiz records: the score summary handed to the stats store and the
//! per-question review shown to the user.

use serde::{Deserialize, Serialize};

use crate::model::Question;

/// Score of one finished quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizSummary {
    pub theme: String,
    pub correct: u32,
    pub wrong: u32,
    /// Share of correct answers in percent.
    pub percentage: f64,
    pub hints_used: u32,
    pub elapsed_secs: u64,
}

impl QuizSummary {
    pub fn answered(&self) -> u32 {
        self.correct + self.wrong
    }
}

/// One submitted answer next to what would have been accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerReview {
    pub prompt: String,
    pub answer: String,
    /// Accepted answers; empty for image questions.
    pub accepted: Vec<String>,
}

impl AnswerReview {
    pub fn new(question: &Question, answer: &str) -> Self {
        Self {
            prompt: question.prompt().to_string(),
            answer: answer.to_string(),
            accepted: question.answers().map(<[String]>::to_vec).unwrap_or_default(),
        }
    }
}
