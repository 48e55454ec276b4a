//! Quiz session state machine.
//!
//! A [`QuizSession`] borrows the catalogue, snapshots a shuffled selection for
//! one theme, and tracks position, score, timing and the submitted answers.
//! It performs no I/O and no timing of its own: the front-end grades input,
//! submits it, and calls [`QuizSession::finish`] when the user submits or the
//! clock runs out.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::QuizError;
use crate::grader::Grade;
use crate::model::Question;
use crate::summary::{AnswerReview, QuizSummary};

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    NotStarted,
    InProgress,
    Finished,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::NotStarted => write!(f, "not started"),
            SessionState::InProgress => write!(f, "in progress"),
            SessionState::Finished => write!(f, "finished"),
        }
    }
}

/// One attempt at a themed quiz.
///
/// The random source is injectable so selection can be reproduced from a seed.
pub struct QuizSession<'b, R = StdRng> {
    catalogue: &'b [Question],
    rng: R,
    theme: String,
    selected: Vec<&'b Question>,
    current_index: usize,
    correct: u32,
    wrong: u32,
    /// Keyed by index into `selected`. Indices only grow, so key order is
    /// also the order of first submission.
    answers: BTreeMap<usize, String>,
    started_at: Option<Instant>,
    finished_at: Option<Instant>,
    time_limit_secs: u64,
    state: SessionState,
}

impl<'b> QuizSession<'b, StdRng> {
    /// A session shuffling with an entropy-seeded generator.
    pub fn new(catalogue: &'b [Question]) -> Self {
        Self::with_rng(catalogue, StdRng::from_entropy())
    }

    /// A session whose selections are reproducible for a given seed.
    pub fn seeded(catalogue: &'b [Question], seed: u64) -> Self {
        Self::with_rng(catalogue, StdRng::seed_from_u64(seed))
    }
}

impl<'b, R> QuizSession<'b, R> {
    pub fn with_rng(catalogue: &'b [Question], rng: R) -> Self {
        Self {
            catalogue,
            rng,
            theme: String::new(),
            selected: Vec::new(),
            current_index: 0,
            correct: 0,
            wrong: 0,
            answers: BTreeMap::new(),
            started_at: None,
            finished_at: None,
            time_limit_secs: 0,
            state: SessionState::NotStarted,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Theme of the current (or last) session; empty before the first start.
    pub fn theme(&self) -> &str {
        &self.theme
    }

    /// The question at the current position, once a session has started.
    pub fn current_question(&self) -> Option<&'b Question> {
        self.selected.get(self.current_index).copied()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn question_count(&self) -> usize {
        self.selected.len()
    }

    /// Returns `true` when positioned on the last selected question.
    pub fn is_last(&self) -> bool {
        !self.selected.is_empty() && self.current_index + 1 == self.selected.len()
    }

    pub fn questions(&self) -> &[&'b Question] {
        &self.selected
    }

    pub fn correct_count(&self) -> u32 {
        self.correct
    }

    pub fn wrong_count(&self) -> u32 {
        self.wrong
    }

    pub fn time_limit_secs(&self) -> u64 {
        self.time_limit_secs
    }

    /// Share of correct answers in percent; `0.0` before anything is recorded.
    pub fn percentage(&self) -> f64 {
        let total = self.correct + self.wrong;
        if total == 0 {
            0.0
        } else {
            100.0 * f64::from(self.correct) / f64::from(total)
        }
    }

    /// Time between start and finish, or between start and now while running.
    pub fn elapsed(&self) -> Duration {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => end.duration_since(start),
            (Some(start), None) => start.elapsed(),
            (None, _) => Duration::ZERO,
        }
    }

    /// Whole seconds of [`elapsed`](Self::elapsed), truncated.
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed().as_secs()
    }

    /// Submitted answers in submission order, last submission per question.
    pub fn answers(&self) -> impl Iterator<Item = (&'b Question, &str)> + '_ {
        self.answers
            .iter()
            .map(|(&i, text)| (self.selected[i], text.as_str()))
    }

    /// The submitted answer for the current question, if any.
    pub fn current_answer(&self) -> Option<&str> {
        self.answers.get(&self.current_index).map(String::as_str)
    }

    /// Overwrite the logged answer text of the current question.
    pub fn store_answer(&mut self, text: impl Into<String>) -> Result<(), QuizError> {
        self.require_in_progress("store an answer")?;
        self.answers.insert(self.current_index, text.into());
        Ok(())
    }

    /// Count one correct or wrong answer.
    pub fn record_answer(&mut self, is_correct: bool) -> Result<(), QuizError> {
        self.require_in_progress("record an answer")?;
        if is_correct {
            self.correct += 1;
        } else {
            self.wrong += 1;
        }
        Ok(())
    }

    /// Store the grade's text and count it in one step.
    pub fn submit(&mut self, grade: &Grade) -> Result<(), QuizError> {
        self.store_answer(grade.answer_text.as_str())?;
        self.record_answer(grade.is_correct)
    }

    /// Move to the next question. Returns `false` without moving when already
    /// on the last one; ending the quiz is [`finish`](Self::finish)'s job.
    pub fn advance(&mut self) -> Result<bool, QuizError> {
        self.require_in_progress("advance")?;
        if self.current_index + 1 < self.selected.len() {
            self.current_index += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Freeze timing and scoring. Repeated calls leave the finish time alone.
    pub fn finish(&mut self) -> Result<(), QuizError> {
        match self.state {
            SessionState::NotStarted => Err(QuizError::InvalidState {
                operation: "finish",
                state: self.state,
            }),
            SessionState::Finished => Ok(()),
            SessionState::InProgress => {
                if self.finished_at.is_none() {
                    self.finished_at = Some(Instant::now());
                }
                self.state = SessionState::Finished;
                tracing::info!(
                    theme = %self.theme,
                    correct = self.correct,
                    wrong = self.wrong,
                    elapsed_secs = self.elapsed_secs(),
                    "quiz finished"
                );
                Ok(())
            }
        }
    }

    /// The record handed to the stats store. `hints_used` is counted by the
    /// front-end and passed through unchanged.
    pub fn summary(&self, hints_used: u32) -> Result<QuizSummary, QuizError> {
        if self.state != SessionState::Finished {
            return Err(QuizError::InvalidState {
                operation: "summarize",
                state: self.state,
            });
        }
        Ok(QuizSummary {
            theme: self.theme.clone(),
            correct: self.correct,
            wrong: self.wrong,
            percentage: self.percentage(),
            hints_used,
            elapsed_secs: self.elapsed_secs(),
        })
    }

    /// Prompt, submitted text and accepted answers for every answered question.
    pub fn review(&self) -> Vec<AnswerReview> {
        self.answers()
            .map(|(q, text)| AnswerReview::new(q, text))
            .collect()
    }

    fn require_in_progress(&self, operation: &'static str) -> Result<(), QuizError> {
        if self.state == SessionState::InProgress {
            Ok(())
        } else {
            Err(QuizError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }
}

impl<'b, R: Rng> QuizSession<'b, R> {
    /// Select up to `requested` shuffled questions of `theme` and start the
    /// clock. Fewer questions than requested are used silently when the theme
    /// has fewer. Calling this again after [`finish`](Self::finish) starts over.
    pub fn start_session(
        &mut self,
        theme: &str,
        requested: usize,
        time_limit_secs: u64,
    ) -> Result<(), QuizError> {
        if self.state == SessionState::InProgress {
            return Err(QuizError::InvalidState {
                operation: "start a session",
                state: self.state,
            });
        }

        let mut filtered: Vec<&'b Question> =
            self.catalogue.iter().filter(|q| q.theme() == theme).collect();
        if filtered.is_empty() {
            return Err(QuizError::EmptyTheme(theme.to_string()));
        }
        if requested == 0 {
            return Err(QuizError::EmptySelection);
        }

        filtered.shuffle(&mut self.rng);
        let available = filtered.len();
        filtered.truncate(requested.min(available));

        if available < requested {
            tracing::debug!(theme, requested, available, "theme has fewer questions than requested");
        }

        self.theme = theme.to_string();
        self.selected = filtered;
        self.current_index = 0;
        self.correct = 0;
        self.wrong = 0;
        self.answers.clear();
        self.started_at = Some(Instant::now());
        self.finished_at = None;
        self.time_limit_secs = time_limit_secs;
        self.state = SessionState::InProgress;

        tracing::info!(
            theme,
            questions = self.selected.len(),
            time_limit_secs,
            "quiz started"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::{QuestionBank, THEME_POINTERS};
    use crate::grader::{grade, Response};
    use crate::model::{Point, QuestionType, Rect};

    fn numeric(theme: &str, prompt: &str, answer: &str) -> Question {
        Question::new(
            theme,
            prompt,
            QuestionType::Numeric,
            None,
            Some(vec![answer.to_string()]),
            None,
        )
        .unwrap()
    }

    fn three_in_x() -> Vec<Question> {
        vec![
            numeric("X", "one", "1"),
            numeric("Y", "other", "9"),
            numeric("X", "two", "2"),
            numeric("X", "three", "3"),
        ]
    }

    fn started(catalogue: &[Question]) -> QuizSession<'_> {
        let mut session = QuizSession::seeded(catalogue, 7);
        session.start_session("X", 10, 60).unwrap();
        session
    }

    #[test]
    fn new_session_is_not_started() {
        let catalogue = three_in_x();
        let session = QuizSession::new(&catalogue);
        assert_eq!(session.state(), SessionState::NotStarted);
        assert!(session.current_question().is_none());
        assert_eq!(session.question_count(), 0);
        assert_eq!(session.percentage(), 0.0);
        assert_eq!(session.elapsed(), Duration::ZERO);
    }

    #[test]
    fn requested_count_is_capped_at_available() {
        let catalogue = three_in_x();
        let session = started(&catalogue);
        assert_eq!(session.question_count(), 3);
        assert_eq!(session.state(), SessionState::InProgress);
        assert!(session.questions().iter().all(|q| q.theme() == "X"));

        let mut prompts: Vec<&str> = session.questions().iter().map(|q| q.prompt()).collect();
        prompts.sort_unstable();
        assert_eq!(prompts, vec!["one", "three", "two"]);
    }

    #[test]
    fn requested_count_truncates_selection() {
        let bank = QuestionBank::builtin();
        let mut session = QuizSession::seeded(bank.questions(), 1);
        session.start_session(THEME_POINTERS, 5, 300).unwrap();
        assert_eq!(session.question_count(), 5);
        assert_eq!(session.time_limit_secs(), 300);
    }

    #[test]
    fn same_seed_same_order() {
        let bank = QuestionBank::builtin();
        let order = |seed| {
            let mut s = QuizSession::seeded(bank.questions(), seed);
            s.start_session(THEME_POINTERS, 12, 0).unwrap();
            s.questions().iter().map(|q| q.prompt().to_string()).collect::<Vec<_>>()
        };
        assert_eq!(order(42), order(42));
        assert_ne!(order(42), order(43));
    }

    #[test]
    fn unknown_theme_is_an_error() {
        let catalogue = three_in_x();
        let mut session = QuizSession::new(&catalogue);
        let err = session.start_session("x", 3, 0).unwrap_err();
        assert_eq!(err, QuizError::EmptyTheme("x".into()));
        assert!(err.is_selection_error());
        assert_eq!(session.state(), SessionState::NotStarted);
    }

    #[test]
    fn zero_questions_is_an_error() {
        let catalogue = three_in_x();
        let mut session = QuizSession::new(&catalogue);
        assert_eq!(session.start_session("X", 0, 0), Err(QuizError::EmptySelection));
    }

    #[test]
    fn operations_require_running_session() {
        let catalogue = three_in_x();
        let mut session = QuizSession::new(&catalogue);
        assert!(matches!(
            session.record_answer(true),
            Err(QuizError::InvalidState { state: SessionState::NotStarted, .. })
        ));
        assert!(session.store_answer("1").is_err());
        assert!(session.advance().is_err());
        assert!(session.finish().is_err());
        assert!(session.summary(0).is_err());

        session.start_session("X", 3, 0).unwrap();
        assert!(matches!(
            session.start_session("X", 3, 0),
            Err(QuizError::InvalidState { state: SessionState::InProgress, .. })
        ));
        session.finish().unwrap();
        assert!(session.record_answer(true).is_err());
        assert!(session.advance().is_err());
    }

    #[test]
    fn advance_stops_at_last_question() {
        let catalogue = three_in_x();
        let mut session = started(&catalogue);
        assert!(!session.is_last());
        assert!(session.advance().unwrap());
        assert!(session.advance().unwrap());
        assert!(session.is_last());
        assert!(!session.advance().unwrap());
        assert_eq!(session.current_index(), 2);
        assert_eq!(session.state(), SessionState::InProgress);
    }

    #[test]
    fn scoring_and_percentage() {
        let catalogue = three_in_x();
        let mut session = started(&catalogue);
        session.record_answer(true).unwrap();
        session.record_answer(false).unwrap();
        session.record_answer(true).unwrap();
        session.record_answer(true).unwrap();
        assert_eq!(session.correct_count(), 3);
        assert_eq!(session.wrong_count(), 1);
        assert!((session.percentage() - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn stored_answer_is_overwritten() {
        let catalogue = three_in_x();
        let mut session = started(&catalogue);
        session.store_answer("first").unwrap();
        session.store_answer("second").unwrap();
        session.advance().unwrap();
        session.store_answer("next").unwrap();

        let log: Vec<&str> = session.answers().map(|(_, text)| text).collect();
        assert_eq!(log, vec!["second", "next"]);
        assert_eq!(session.current_answer(), Some("next"));
    }

    #[test]
    fn answer_log_follows_submission_order() {
        let catalogue = three_in_x();
        let mut session = started(&catalogue);
        let expected: Vec<&str> = session.questions().iter().map(|q| q.prompt()).collect();
        for _ in 0..3 {
            let q = session.current_question().unwrap();
            session.store_answer(q.prompt()).unwrap();
            session.advance().unwrap();
        }
        let logged: Vec<&str> = session.answers().map(|(q, _)| q.prompt()).collect();
        assert_eq!(logged, expected);
    }

    #[test]
    fn finish_is_idempotent() {
        let catalogue = three_in_x();
        let mut session = started(&catalogue);
        session.record_answer(true).unwrap();
        session.finish().unwrap();
        let first = session.elapsed();
        std::thread::sleep(Duration::from_millis(20));
        session.finish().unwrap();
        assert_eq!(session.elapsed(), first);
        assert_eq!(session.correct_count(), 1);
        assert_eq!(session.state(), SessionState::Finished);
    }

    #[test]
    fn restart_resets_everything() {
        let catalogue = three_in_x();
        let mut session = started(&catalogue);
        session.submit(&grade(session.current_question().unwrap(), &Response::Text("0".into())))
            .unwrap();
        session.advance().unwrap();
        session.finish().unwrap();

        session.start_session("Y", 5, 30).unwrap();
        assert_eq!(session.state(), SessionState::InProgress);
        assert_eq!(session.question_count(), 1);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.correct_count() + session.wrong_count(), 0);
        assert_eq!(session.answers().count(), 0);
        assert_eq!(session.theme(), "Y");
        assert_eq!(session.time_limit_secs(), 30);
    }

    #[test]
    fn summary_passes_hints_through() {
        let catalogue = three_in_x();
        let mut session = started(&catalogue);
        session.record_answer(true).unwrap();
        session.record_answer(false).unwrap();
        session.finish().unwrap();

        let summary = session.summary(4).unwrap();
        assert_eq!(summary.theme, "X");
        assert_eq!(summary.correct, 1);
        assert_eq!(summary.wrong, 1);
        assert_eq!(summary.hints_used, 4);
        assert!((summary.percentage - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn end_to_end_image_click_overwrite() {
        let catalogue = vec![Question::image_click(
            "X",
            "find the bug",
            "bug.png",
            vec![Rect::new(65, 121, 57, 17)],
            None,
        )
        .unwrap()];
        let mut session = QuizSession::seeded(&catalogue, 0);
        session.start_session("X", 1, 0).unwrap();
        let q = session.current_question().unwrap();

        let mut tracker = crate::grader::ClickTracker::new();
        tracker.click(Point::new(70, 125));
        session.store_answer(grade(q, &tracker.response()).answer_text).unwrap();
        tracker.click(Point::new(0, 0));
        let last = grade(q, &tracker.response());
        session.submit(&last).unwrap();
        session.finish().unwrap();

        assert_eq!(session.wrong_count(), 1);
        assert_eq!(session.correct_count(), 0);
        assert_eq!(session.answers().next().map(|(_, t)| t), Some("wrong"));
    }

    #[test]
    fn review_lists_accepted_answers() {
        let catalogue = three_in_x();
        let mut session = started(&catalogue);
        let q = session.current_question().unwrap();
        session.submit(&grade(q, &Response::Text("42".into()))).unwrap();
        session.finish().unwrap();

        let review = session.review();
        assert_eq!(review.len(), 1);
        assert_eq!(review[0].prompt, q.prompt());
        assert_eq!(review[0].answer, "42");
        assert_eq!(review[0].accepted, q.answers().unwrap().to_vec());
    }
}
