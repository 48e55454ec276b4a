//! Core data model types for cquiz.
//!
//! A [`Question`] is built once, validated at construction, and never mutated
//! afterwards. The per-type data lives in the closed [`QuestionKind`] union so
//! that every consumer has to handle all seven answer modalities.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::QuestionError;

/// Normalize a string for comparison: trim, collapse whitespace runs into a
/// single space, and lowercase.
pub fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// The seven supported answer modalities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    SingleChoice,
    MultiChoice,
    Numeric,
    FreeText,
    Dropdown,
    Slider,
    ImageClick,
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionType::SingleChoice => write!(f, "single_choice"),
            QuestionType::MultiChoice => write!(f, "multi_choice"),
            QuestionType::Numeric => write!(f, "numeric"),
            QuestionType::FreeText => write!(f, "free_text"),
            QuestionType::Dropdown => write!(f, "dropdown"),
            QuestionType::Slider => write!(f, "slider"),
            QuestionType::ImageClick => write!(f, "image_click"),
        }
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "single_choice" | "radio" => Ok(QuestionType::SingleChoice),
            "multi_choice" | "checkbox" => Ok(QuestionType::MultiChoice),
            "numeric" | "number" => Ok(QuestionType::Numeric),
            "free_text" | "text" => Ok(QuestionType::FreeText),
            "dropdown" | "combobox" => Ok(QuestionType::Dropdown),
            "slider" => Ok(QuestionType::Slider),
            "image_click" | "image" => Ok(QuestionType::ImageClick),
            other => Err(format!("unknown question type: {other}")),
        }
    }
}

/// A click position on a reference image, in image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle on a reference image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Half-open containment: the right and bottom edges are outside.
    pub fn contains(&self, p: Point) -> bool {
        let (px, py) = (i64::from(p.x), i64::from(p.y));
        let (x, y) = (i64::from(self.x), i64::from(self.y));
        px >= x
            && py >= y
            && px < x + i64::from(self.width)
            && py < y + i64::from(self.height)
    }

    fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// Options and accepted answers of a choice-type question.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceSpec {
    pub options: Vec<String>,
    pub answers: Vec<String>,
}

/// Range and accepted values of a slider question.
#[derive(Debug, Clone, PartialEq)]
pub struct SliderSpec {
    /// The bounds as authored: `[min, max]` or `[min, max, default]`.
    pub options: Vec<String>,
    pub min: i64,
    pub max: i64,
    /// Starting position, already clamped into `min..=max`.
    pub initial: i64,
    pub answers: Vec<String>,
}

impl SliderSpec {
    /// Clamp a position into the slider range.
    pub fn clamp(&self, value: i64) -> i64 {
        value.clamp(self.min, self.max)
    }
}

/// Reference image and correct regions of an image-click question.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSpec {
    pub image_path: String,
    pub correct_areas: Vec<Rect>,
}

impl ImageSpec {
    /// Returns `true` if the point falls inside at least one correct region.
    pub fn hit(&self, p: Point) -> bool {
        self.correct_areas.iter().any(|r| r.contains(p))
    }
}

/// Per-type question data.
#[derive(Debug, Clone, PartialEq)]
pub enum QuestionKind {
    SingleChoice(ChoiceSpec),
    MultiChoice(ChoiceSpec),
    Numeric { answers: Vec<String> },
    FreeText { answers: Vec<String> },
    Dropdown(ChoiceSpec),
    Slider(SliderSpec),
    ImageClick(ImageSpec),
}

impl QuestionKind {
    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionKind::SingleChoice(_) => QuestionType::SingleChoice,
            QuestionKind::MultiChoice(_) => QuestionType::MultiChoice,
            QuestionKind::Numeric { .. } => QuestionType::Numeric,
            QuestionKind::FreeText { .. } => QuestionType::FreeText,
            QuestionKind::Dropdown(_) => QuestionType::Dropdown,
            QuestionKind::Slider(_) => QuestionType::Slider,
            QuestionKind::ImageClick(_) => QuestionType::ImageClick,
        }
    }
}

/// A single quiz question.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    theme: String,
    prompt: String,
    hint: Option<String>,
    kind: QuestionKind,
}

impl Question {
    /// Build a question of any type except [`QuestionType::ImageClick`], which
    /// needs [`Question::image_click`].
    pub fn new(
        theme: impl Into<String>,
        prompt: impl Into<String>,
        question_type: QuestionType,
        options: Option<Vec<String>>,
        answers: Option<Vec<String>>,
        hint: Option<String>,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        let answers = answers.unwrap_or_default();

        let kind = match question_type {
            QuestionType::SingleChoice => {
                QuestionKind::SingleChoice(choice_spec(&prompt, options, answers)?)
            }
            QuestionType::MultiChoice => {
                QuestionKind::MultiChoice(choice_spec(&prompt, options, answers)?)
            }
            QuestionType::Dropdown => {
                QuestionKind::Dropdown(choice_spec(&prompt, options, answers)?)
            }
            QuestionType::Numeric => QuestionKind::Numeric {
                answers: free_answers(&prompt, question_type, options, answers)?,
            },
            QuestionType::FreeText => QuestionKind::FreeText {
                answers: free_answers(&prompt, question_type, options, answers)?,
            },
            QuestionType::Slider => {
                QuestionKind::Slider(slider_spec(&prompt, options.unwrap_or_default(), answers)?)
            }
            QuestionType::ImageClick => {
                return Err(QuestionError::InvalidImage {
                    prompt,
                    reason: "image path and click regions are required".into(),
                });
            }
        };

        Ok(Self {
            theme: theme.into(),
            prompt,
            hint,
            kind,
        })
    }

    /// Build an image-click question.
    pub fn image_click(
        theme: impl Into<String>,
        prompt: impl Into<String>,
        image_path: impl Into<String>,
        correct_areas: Vec<Rect>,
        hint: Option<String>,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        let image_path = image_path.into();

        if image_path.trim().is_empty() {
            return Err(QuestionError::InvalidImage {
                prompt,
                reason: "image path is empty".into(),
            });
        }
        if correct_areas.is_empty() {
            return Err(QuestionError::InvalidImage {
                prompt,
                reason: "no correct areas".into(),
            });
        }
        if let Some(r) = correct_areas.iter().find(|r| r.is_empty()) {
            return Err(QuestionError::InvalidImage {
                prompt,
                reason: format!("area {}x{} at ({}, {}) is empty", r.width, r.height, r.x, r.y),
            });
        }

        Ok(Self {
            theme: theme.into(),
            prompt,
            hint,
            kind: QuestionKind::ImageClick(ImageSpec {
                image_path,
                correct_areas,
            }),
        })
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// The hint, if one exists and is not blank.
    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref().filter(|h| !h.trim().is_empty())
    }

    pub fn kind(&self) -> &QuestionKind {
        &self.kind
    }

    pub fn question_type(&self) -> QuestionType {
        self.kind.question_type()
    }

    /// Candidate choices, or slider bounds; `None` for free-form and image questions.
    pub fn options(&self) -> Option<&[String]> {
        match &self.kind {
            QuestionKind::SingleChoice(c) | QuestionKind::MultiChoice(c) | QuestionKind::Dropdown(c) => {
                Some(&c.options)
            }
            QuestionKind::Slider(s) => Some(&s.options),
            QuestionKind::Numeric { .. } | QuestionKind::FreeText { .. } | QuestionKind::ImageClick(_) => {
                None
            }
        }
    }

    /// Accepted answers; `None` for image questions.
    pub fn answers(&self) -> Option<&[String]> {
        match &self.kind {
            QuestionKind::SingleChoice(c) | QuestionKind::MultiChoice(c) | QuestionKind::Dropdown(c) => {
                Some(&c.answers)
            }
            QuestionKind::Numeric { answers } | QuestionKind::FreeText { answers } => Some(answers),
            QuestionKind::Slider(s) => Some(&s.answers),
            QuestionKind::ImageClick(_) => None,
        }
    }

    pub fn image_path(&self) -> Option<&str> {
        match &self.kind {
            QuestionKind::ImageClick(img) => Some(&img.image_path),
            _ => None,
        }
    }

    /// Correct click regions; empty unless this is an image question.
    pub fn correct_areas(&self) -> &[Rect] {
        match &self.kind {
            QuestionKind::ImageClick(img) => &img.correct_areas,
            _ => &[],
        }
    }
}

fn choice_spec(
    prompt: &str,
    options: Option<Vec<String>>,
    answers: Vec<String>,
) -> Result<ChoiceSpec, QuestionError> {
    let options = options.unwrap_or_default();
    if options.is_empty() {
        return Err(QuestionError::MissingOptions {
            prompt: prompt.to_string(),
        });
    }
    if answers.is_empty() {
        return Err(QuestionError::MissingAnswers {
            prompt: prompt.to_string(),
        });
    }

    let normalized: Vec<String> = options.iter().map(|o| normalize(o)).collect();
    if let Some(stray) = answers
        .iter()
        .find(|a| !normalized.contains(&normalize(a)))
    {
        return Err(QuestionError::AnswerNotAnOption {
            prompt: prompt.to_string(),
            answer: stray.clone(),
        });
    }

    Ok(ChoiceSpec { options, answers })
}

fn free_answers(
    prompt: &str,
    question_type: QuestionType,
    options: Option<Vec<String>>,
    answers: Vec<String>,
) -> Result<Vec<String>, QuestionError> {
    if options.is_some_and(|o| !o.is_empty()) {
        return Err(QuestionError::UnexpectedField {
            prompt: prompt.to_string(),
            kind: question_type.to_string(),
            field: "options",
        });
    }
    if answers.is_empty() {
        return Err(QuestionError::MissingAnswers {
            prompt: prompt.to_string(),
        });
    }
    Ok(answers)
}

fn slider_spec(
    prompt: &str,
    options: Vec<String>,
    answers: Vec<String>,
) -> Result<SliderSpec, QuestionError> {
    let invalid = |reason: String| QuestionError::InvalidSlider {
        prompt: prompt.to_string(),
        reason,
    };

    if !(2..=3).contains(&options.len()) {
        return Err(invalid(format!(
            "expected [min, max] or [min, max, default], got {} value(s)",
            options.len()
        )));
    }

    let bounds = options
        .iter()
        .map(|o| {
            o.trim()
                .parse::<i64>()
                .map_err(|_| invalid(format!("'{o}' is not an integer")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let (min, max) = (bounds[0], bounds[1]);
    if min > max {
        return Err(invalid(format!("min {min} is greater than max {max}")));
    }
    let initial = bounds.get(2).copied().unwrap_or(min).clamp(min, max);

    if answers.is_empty() {
        return Err(QuestionError::MissingAnswers {
            prompt: prompt.to_string(),
        });
    }

    Ok(SliderSpec {
        options,
        min,
        max,
        initial,
        answers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn normalize_collapses_and_lowercases() {
        assert_eq!(normalize("  A   b\n"), "a b");
        assert_eq!(normalize("\tDo\n  While "), "do while");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn question_type_display_and_parse() {
        assert_eq!(QuestionType::SingleChoice.to_string(), "single_choice");
        assert_eq!("radio".parse::<QuestionType>().unwrap(), QuestionType::SingleChoice);
        assert_eq!("checkbox".parse::<QuestionType>().unwrap(), QuestionType::MultiChoice);
        assert_eq!("Image-Click".parse::<QuestionType>().unwrap(), QuestionType::ImageClick);
        assert_eq!("combobox".parse::<QuestionType>().unwrap(), QuestionType::Dropdown);
        assert!("essay".parse::<QuestionType>().is_err());
    }

    #[test]
    fn rect_is_half_open() {
        let r = Rect::new(10, 20, 5, 5);
        assert!(r.contains(Point::new(10, 20)));
        assert!(r.contains(Point::new(14, 24)));
        assert!(!r.contains(Point::new(15, 22)));
        assert!(!r.contains(Point::new(12, 25)));
        assert!(!r.contains(Point::new(9, 22)));
    }

    #[test]
    fn choice_answers_must_be_options() {
        let err = Question::new(
            "t",
            "pick",
            QuestionType::SingleChoice,
            Some(strings(&["yes", "no"])),
            Some(strings(&["maybe"])),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, QuestionError::AnswerNotAnOption { .. }));

        // Normalization applies on both sides.
        let q = Question::new(
            "t",
            "pick",
            QuestionType::SingleChoice,
            Some(strings(&["Yes", "No "])),
            Some(strings(&["  no"])),
            None,
        )
        .unwrap();
        assert_eq!(q.question_type(), QuestionType::SingleChoice);
    }

    #[test]
    fn choice_requires_options_and_answers() {
        let err = Question::new("t", "p", QuestionType::Dropdown, None, Some(strings(&["a"])), None)
            .unwrap_err();
        assert!(matches!(err, QuestionError::MissingOptions { .. }));

        let err = Question::new("t", "p", QuestionType::MultiChoice, Some(strings(&["a"])), None, None)
            .unwrap_err();
        assert!(matches!(err, QuestionError::MissingAnswers { .. }));
    }

    #[test]
    fn slider_bounds_are_validated() {
        let q = Question::new(
            "t",
            "slide",
            QuestionType::Slider,
            Some(strings(&["-16", "-4", "-8"])),
            Some(strings(&["-4"])),
            None,
        )
        .unwrap();
        let QuestionKind::Slider(spec) = q.kind() else {
            panic!("expected slider");
        };
        assert_eq!((spec.min, spec.max, spec.initial), (-16, -4, -8));

        let one_bound = Question::new(
            "t",
            "slide",
            QuestionType::Slider,
            Some(strings(&["3"])),
            Some(strings(&["3"])),
            None,
        );
        assert!(matches!(one_bound, Err(QuestionError::InvalidSlider { .. })));

        let not_numeric = Question::new(
            "t",
            "slide",
            QuestionType::Slider,
            Some(strings(&["zero", "6"])),
            Some(strings(&["3"])),
            None,
        );
        assert!(matches!(not_numeric, Err(QuestionError::InvalidSlider { .. })));

        let reversed = Question::new(
            "t",
            "slide",
            QuestionType::Slider,
            Some(strings(&["6", "0"])),
            Some(strings(&["3"])),
            None,
        );
        assert!(matches!(reversed, Err(QuestionError::InvalidSlider { .. })));
    }

    #[test]
    fn slider_default_is_clamped() {
        let q = Question::new(
            "t",
            "slide",
            QuestionType::Slider,
            Some(strings(&["0", "6", "9"])),
            Some(strings(&["2"])),
            None,
        )
        .unwrap();
        let QuestionKind::Slider(spec) = q.kind() else {
            panic!("expected slider");
        };
        assert_eq!(spec.initial, 6);
        assert_eq!(spec.clamp(-3), 0);
    }

    #[test]
    fn free_text_rejects_options() {
        let err = Question::new(
            "t",
            "p",
            QuestionType::FreeText,
            Some(strings(&["a"])),
            Some(strings(&["a"])),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, QuestionError::UnexpectedField { field: "options", .. }));
    }

    #[test]
    fn image_click_needs_areas() {
        assert!(Question::new("t", "p", QuestionType::ImageClick, None, None, None).is_err());
        assert!(Question::image_click("t", "p", "img.png", vec![], None).is_err());
        assert!(Question::image_click("t", "p", "img.png", vec![Rect::new(0, 0, 0, 4)], None).is_err());

        let q = Question::image_click("t", "p", "img.png", vec![Rect::new(1, 2, 3, 4)], None).unwrap();
        assert_eq!(q.image_path(), Some("img.png"));
        assert_eq!(q.correct_areas().len(), 1);
        assert!(q.options().is_none());
        assert!(q.answers().is_none());
    }

    #[test]
    fn blank_hint_is_absent() {
        let q = Question::new(
            "t",
            "p",
            QuestionType::Numeric,
            None,
            Some(strings(&["1"])),
            Some("   ".into()),
        )
        .unwrap();
        assert!(q.hint().is_none());
        assert!(q.correct_areas().is_empty());
    }
}
