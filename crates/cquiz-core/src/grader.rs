//! Answer grading.
//!
//! [`grade`] is a pure function of a question and the raw input collected by
//! the front-end. Every comparison goes through [`normalize`] first, except
//! slider positions and image clicks which are not text.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::{normalize, ChoiceSpec, ImageSpec, Point, Question, QuestionKind, SliderSpec};

/// Absolute tolerance for numeric answers.
pub const NUMERIC_TOLERANCE: f64 = 1e-6;

/// Raw user input for one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Response {
    /// A single selected option, for single-choice and dropdown questions.
    Choice(Option<String>),
    /// Every selected option, for multi-choice questions.
    Choices(Vec<String>),
    /// Typed text, for numeric and free-text questions.
    Text(String),
    /// Slider position.
    Position(i64),
    /// The most recent click on the image, if any.
    Click(Option<Point>),
}

/// Outcome of grading one response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grade {
    pub is_correct: bool,
    /// The user's answer as displayed in the review and stored in the log.
    pub answer_text: String,
}

impl Grade {
    fn new(is_correct: bool, answer_text: impl Into<String>) -> Self {
        Self {
            is_correct,
            answer_text: answer_text.into(),
        }
    }

    fn unanswered() -> Self {
        Self::new(false, "")
    }
}

/// Grade a response against a question.
pub fn grade(question: &Question, response: &Response) -> Grade {
    let graded = match (question.kind(), response) {
        (QuestionKind::SingleChoice(spec), Response::Choice(selected))
        | (QuestionKind::Dropdown(spec), Response::Choice(selected)) => {
            grade_single(spec, selected.as_deref())
        }
        (QuestionKind::MultiChoice(spec), Response::Choices(selected)) => {
            grade_multi(spec, selected)
        }
        (QuestionKind::Numeric { answers }, Response::Text(input)) => {
            Grade::new(numeric_matches(input, answers), input.as_str())
        }
        (QuestionKind::FreeText { answers }, Response::Text(input)) => {
            Grade::new(any_normalized_eq(input, answers), input.as_str())
        }
        (QuestionKind::Slider(spec), Response::Position(value)) => grade_slider(spec, *value),
        (QuestionKind::ImageClick(spec), Response::Click(click)) => grade_click(spec, *click),
        (
            QuestionKind::SingleChoice(_)
            | QuestionKind::Dropdown(_)
            | QuestionKind::MultiChoice(_)
            | QuestionKind::Numeric { .. }
            | QuestionKind::FreeText { .. }
            | QuestionKind::Slider(_)
            | QuestionKind::ImageClick(_),
            _,
        ) => {
            tracing::debug!(
                question_type = %question.question_type(),
                ?response,
                "response shape does not match question type"
            );
            Grade::unanswered()
        }
    };

    tracing::trace!(correct = graded.is_correct, answer = %graded.answer_text, "graded");
    graded
}

fn any_normalized_eq(input: &str, answers: &[String]) -> bool {
    let input = normalize(input);
    answers.iter().any(|a| normalize(a) == input)
}

fn grade_single(spec: &ChoiceSpec, selected: Option<&str>) -> Grade {
    match selected {
        Some(choice) => Grade::new(any_normalized_eq(choice, &spec.answers), choice),
        None => Grade::unanswered(),
    }
}

fn grade_multi(spec: &ChoiceSpec, selected: &[String]) -> Grade {
    let chosen: HashSet<String> = selected.iter().map(|s| normalize(s)).collect();
    let accepted: HashSet<String> = spec.answers.iter().map(|s| normalize(s)).collect();

    // Display selections in the order the options are listed.
    let position = |s: &String| {
        let n = normalize(s);
        spec.options
            .iter()
            .position(|o| normalize(o) == n)
            .unwrap_or(usize::MAX)
    };
    let mut ordered: Vec<&String> = selected.iter().collect();
    ordered.sort_by_key(|s| position(*s));
    let text = ordered
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    Grade::new(chosen == accepted, text)
}

/// Returns `true` if `input` parses as a float within [`NUMERIC_TOLERANCE`]
/// of any accepted answer. Unparsable input never matches.
pub fn numeric_matches(input: &str, answers: &[String]) -> bool {
    let Ok(value) = normalize(input).parse::<f64>() else {
        return false;
    };
    answers
        .iter()
        .filter_map(|a| normalize(a).parse::<f64>().ok())
        .any(|expected| (value - expected).abs() < NUMERIC_TOLERANCE)
}

fn grade_slider(spec: &SliderSpec, value: i64) -> Grade {
    let is_correct = spec
        .answers
        .iter()
        .filter_map(|a| normalize(a).parse::<i64>().ok())
        .any(|expected| expected == value);
    Grade::new(is_correct, value.to_string())
}

fn grade_click(spec: &ImageSpec, click: Option<Point>) -> Grade {
    match click {
        Some(p) if spec.hit(p) => Grade::new(true, "correct"),
        Some(_) => Grade::new(false, "wrong"),
        None => Grade::unanswered(),
    }
}

/// Holds the latest click on an image question. Each click replaces the
/// previous one, so only the last click before moving on is graded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClickTracker {
    last: Option<Point>,
}

impl ClickTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn click(&mut self, point: Point) {
        self.last = Some(point);
    }

    pub fn last(&self) -> Option<Point> {
        self.last
    }

    pub fn clear(&mut self) {
        self.last = None;
    }

    pub fn response(&self) -> Response {
        Response::Click(self.last)
    }
}
