//! Terminal rendering and line-input parsing for the quiz loop.

use comfy_table::{Cell, Table};

use cquiz_core::clock::format_remaining;
use cquiz_core::grader::Response;
use cquiz_core::model::{normalize, Point, Question, QuestionKind};
use cquiz_core::summary::{AnswerReview, QuizSummary};
use cquiz_stats::record::HEADERS;
use cquiz_stats::row::format_percentage;
use cquiz_stats::HistoryEntry;

/// What one line of user input means for the current question.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// A complete answer, ready to grade.
    Answer(Response),
    /// A click on the reference image; more may follow.
    Click(Point),
    /// Submit the clicks collected so far.
    Submit,
    Hint,
    Quit,
}

/// Render a question with its number, options and input instructions.
pub fn render_question(question: &Question, index: usize, count: usize) -> String {
    let mut out = format!(
        "\nQuestion {}/{} [{}]\n{}\n",
        index + 1,
        count,
        question.theme(),
        question.prompt()
    );

    match question.kind() {
        QuestionKind::SingleChoice(spec) | QuestionKind::Dropdown(spec) => {
            push_options(&mut out, &spec.options);
            out.push_str("Answer with an option number or its text.\n");
        }
        QuestionKind::MultiChoice(spec) => {
            push_options(&mut out, &spec.options);
            out.push_str("Select all that apply, separated by commas (e.g. 1,3).\n");
        }
        QuestionKind::Numeric { .. } => out.push_str("Type a number.\n"),
        QuestionKind::FreeText { .. } => out.push_str("Type your answer.\n"),
        QuestionKind::Slider(spec) => {
            out.push_str(&format!(
                "Pick a whole number from {} to {} (Enter keeps {}).\n",
                spec.min, spec.max, spec.initial
            ));
        }
        QuestionKind::ImageClick(spec) => {
            out.push_str(&format!("Image: {}\n", spec.image_path));
            out.push_str("Enter click coordinates as x,y; press Enter on an empty line to submit.\n");
        }
    }

    if question.hint().is_some() {
        out.push_str("(:hint for a hint, :quit to stop)\n");
    } else {
        out.push_str("(:quit to stop)\n");
    }
    out
}

fn push_options(out: &mut String, options: &[String]) {
    for (i, option) in options.iter().enumerate() {
        out.push_str(&format!("  {}) {}\n", i + 1, option));
    }
}

/// Interpret one input line for `question`.
///
/// `Err` carries a message to show before asking again.
pub fn parse_input(question: &Question, line: &str) -> Result<Input, String> {
    let trimmed = line.trim();
    match trimmed {
        ":hint" | ":h" => return Ok(Input::Hint),
        ":quit" | ":q" => return Ok(Input::Quit),
        _ => {}
    }

    match question.kind() {
        QuestionKind::SingleChoice(spec) | QuestionKind::Dropdown(spec) => {
            if trimmed.is_empty() {
                return Ok(Input::Answer(Response::Choice(None)));
            }
            let option = resolve_option(&spec.options, trimmed)?;
            Ok(Input::Answer(Response::Choice(Some(option))))
        }
        QuestionKind::MultiChoice(spec) => {
            let mut selected = Vec::new();
            for part in trimmed.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                let option = resolve_option(&spec.options, part)?;
                if !selected.contains(&option) {
                    selected.push(option);
                }
            }
            Ok(Input::Answer(Response::Choices(selected)))
        }
        QuestionKind::Numeric { .. } | QuestionKind::FreeText { .. } => {
            Ok(Input::Answer(Response::Text(line.trim_end_matches(['\r', '\n']).to_string())))
        }
        QuestionKind::Slider(spec) => {
            if trimmed.is_empty() {
                return Ok(Input::Answer(Response::Position(spec.initial)));
            }
            match trimmed.parse::<i64>() {
                Ok(v) if (spec.min..=spec.max).contains(&v) => {
                    Ok(Input::Answer(Response::Position(v)))
                }
                _ => Err(format!(
                    "Enter a whole number from {} to {}.",
                    spec.min, spec.max
                )),
            }
        }
        QuestionKind::ImageClick(_) => {
            if trimmed.is_empty() {
                return Ok(Input::Submit);
            }
            parse_point(trimmed)
                .map(Input::Click)
                .ok_or_else(|| "Enter a click as x,y (e.g. 120,64).".to_string())
        }
    }
}

/// Match an option by its normalized text, then by 1-based number. Text wins
/// so numeric options like "5" mean themselves.
fn resolve_option(options: &[String], input: &str) -> Result<String, String> {
    let wanted = normalize(input);
    if let Some(option) = options.iter().find(|o| normalize(o) == wanted) {
        return Ok(option.clone());
    }
    input
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| options.get(i))
        .cloned()
        .ok_or_else(|| format!("'{input}' is not one of the options."))
}

fn parse_point(input: &str) -> Option<Point> {
    let (x, y) = input.split_once(',')?;
    Some(Point::new(x.trim().parse().ok()?, y.trim().parse().ok()?))
}

/// The answer currently "on screen" when time runs out. Only image clicks and
/// the slider hold a value between lines; everything else is unanswered.
pub fn held_response(question: &Question, last_click: Option<Point>) -> Response {
    match question.kind() {
        QuestionKind::SingleChoice(_) | QuestionKind::Dropdown(_) => Response::Choice(None),
        QuestionKind::MultiChoice(_) => Response::Choices(Vec::new()),
        QuestionKind::Numeric { .. } | QuestionKind::FreeText { .. } => {
            Response::Text(String::new())
        }
        QuestionKind::Slider(spec) => Response::Position(spec.initial),
        QuestionKind::ImageClick(_) => Response::Click(last_click),
    }
}

pub fn render_summary(summary: &QuizSummary) -> String {
    format!(
        "\nQuiz finished: {}\n  Correct: {}\n  Wrong: {}\n  Score: {}%\n  Hints used: {}\n  Time: {}\n",
        summary.theme,
        summary.correct,
        summary.wrong,
        format_percentage(summary.percentage),
        summary.hints_used,
        format_remaining(summary.elapsed_secs),
    )
}

/// Submitted answers next to the accepted ones.
pub fn review_table(reviews: &[AnswerReview]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["#", "Question", "Your answer", "Accepted"]);

    for (i, review) in reviews.iter().enumerate() {
        let prompt = review.prompt.lines().next().unwrap_or_default();
        let answer = if review.answer.is_empty() {
            "(no answer)"
        } else {
            review.answer.as_str()
        };
        let accepted = if review.accepted.is_empty() {
            "(marked region)".to_string()
        } else {
            review.accepted.join(" | ")
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(prompt),
            Cell::new(answer),
            Cell::new(accepted),
        ]);
    }

    table
}

pub fn history_table(entries: &[HistoryEntry]) -> Table {
    let mut table = Table::new();
    table.set_header(HEADERS.to_vec());

    for e in entries {
        table.add_row(vec![
            Cell::new(&e.timestamp),
            Cell::new(&e.theme),
            Cell::new(e.correct),
            Cell::new(e.wrong),
            Cell::new(format_percentage(e.percentage)),
            Cell::new(e.hints_used),
            Cell::new(e.elapsed_secs),
        ]);
    }

    table
}
