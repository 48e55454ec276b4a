//! TOML question bank parser.
//!
//! Loads question banks from TOML files and directories, and validates them.
//! Hard invariant violations (bad slider bounds, answers that are not options,
//! ...) reject the file; softer content issues come back as warnings.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::bank::QuestionBank;
use crate::model::{Question, QuestionKind, QuestionType, Rect};

/// Intermediate TOML structure for parsing bank files.
#[derive(Debug, Deserialize)]
struct TomlBankFile {
    bank: TomlBankHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlBankHeader {
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    theme: String,
    prompt: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    options: Option<Vec<String>>,
    #[serde(default)]
    answers: Option<Vec<String>>,
    #[serde(default)]
    hint: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    areas: Vec<Rect>,
}

/// A parsed bank file.
#[derive(Debug, Clone)]
pub struct BankFile {
    /// File the bank was read from; relative image paths resolve against its directory.
    pub path: PathBuf,
    pub name: String,
    pub description: String,
    pub bank: QuestionBank,
}

/// Parse a single TOML file into a [`BankFile`].
pub fn parse_bank(path: &Path) -> Result<BankFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question bank: {}", path.display()))?;

    parse_bank_str(&content, path)
}

/// Parse a TOML string into a [`BankFile`] (useful for testing).
pub fn parse_bank_str(content: &str, source_path: &Path) -> Result<BankFile> {
    let parsed: TomlBankFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let questions = parsed
        .questions
        .into_iter()
        .enumerate()
        .map(|(i, q)| {
            build_question(q).with_context(|| {
                format!("invalid question #{} in {}", i + 1, source_path.display())
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(BankFile {
        path: source_path.to_path_buf(),
        name: parsed.bank.name,
        description: parsed.bank.description,
        bank: QuestionBank::new(questions),
    })
}

fn build_question(q: TomlQuestion) -> Result<Question> {
    let question_type: QuestionType = q.kind.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let question = if question_type == QuestionType::ImageClick {
        if q.options.is_some() || q.answers.is_some() {
            anyhow::bail!("image_click questions take `image` and `areas`, not options or answers");
        }
        Question::image_click(
            q.theme,
            q.prompt,
            q.image.unwrap_or_default(),
            q.areas,
            q.hint,
        )?
    } else {
        if q.image.is_some() || !q.areas.is_empty() {
            anyhow::bail!("only image_click questions take `image` and `areas`");
        }
        Question::new(q.theme, q.prompt, question_type, q.options, q.answers, q.hint)?
    };

    Ok(question)
}

/// Recursively load every `.toml` bank under a directory and merge them.
/// Files that fail to parse are skipped with a warning.
pub fn load_bank_directory(dir: &Path) -> Result<Vec<BankFile>> {
    let mut banks = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            banks.extend(load_bank_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_bank(&path) {
                Ok(bank) => banks.push(bank),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(banks)
}

/// Load a bank from a file, or merge all banks in a directory.
pub fn load_bank(path: &Path) -> Result<QuestionBank> {
    if path.is_dir() {
        let questions = load_bank_directory(path)?
            .into_iter()
            .flat_map(|f| f.bank.questions().to_vec())
            .collect::<Vec<_>>();
        anyhow::ensure!(
            !questions.is_empty(),
            "no questions found under {}",
            path.display()
        );
        Ok(QuestionBank::new(questions))
    } else {
        Ok(parse_bank(path)?.bank)
    }
}

/// A warning from bank validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The prompt of the offending question (if applicable).
    pub prompt: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn question(q: &Question, message: impl Into<String>) -> Self {
        Self {
            prompt: Some(q.prompt().lines().next().unwrap_or_default().to_string()),
            message: message.into(),
        }
    }
}

/// Validate a bank for content issues that do not break grading.
///
/// `base_dir` resolves relative image paths; `question_count` is the number of
/// questions a quiz normally draws per theme.
pub fn validate_bank(
    bank: &QuestionBank,
    base_dir: Option<&Path>,
    question_count: usize,
) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    // Check for duplicate questions within a theme
    let mut seen = HashSet::new();
    for q in bank.questions() {
        if !seen.insert((q.theme(), q.prompt(), q.image_path())) {
            warnings.push(ValidationWarning::question(
                q,
                format!("duplicate question in theme \"{}\"", q.theme()),
            ));
        }
    }

    // Check for missing hints
    for q in bank.questions() {
        if q.hint().is_none() {
            warnings.push(ValidationWarning::question(q, "no hint provided"));
        }
    }

    // Check slider answers against the range
    for q in bank.questions() {
        let QuestionKind::Slider(spec) = q.kind() else {
            continue;
        };
        for answer in &spec.answers {
            match answer.trim().parse::<i64>() {
                Ok(v) if (spec.min..=spec.max).contains(&v) => {}
                Ok(v) => warnings.push(ValidationWarning::question(
                    q,
                    format!("answer {v} is outside the slider range {}..={}", spec.min, spec.max),
                )),
                Err(_) => warnings.push(ValidationWarning::question(
                    q,
                    format!("slider answer '{answer}' is not an integer and can never match"),
                )),
            }
        }
    }

    // Check that reference images exist
    if let Some(base) = base_dir {
        for q in bank.questions() {
            if let Some(image) = q.image_path() {
                if !base.join(image).exists() {
                    warnings.push(ValidationWarning::question(
                        q,
                        format!("image not found: {image}"),
                    ));
                }
            }
        }
    }

    // Check theme sizes
    for theme in bank.themes() {
        let count = bank.count_for(theme);
        if count < question_count {
            warnings.push(ValidationWarning {
                prompt: None,
                message: format!(
                    "theme \"{theme}\" has {count} question(s); quizzes of {question_count} will be shorter"
                ),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_TOML: &str = r#"
[bank]
name = "Test Bank"
description = "A test bank"

[[questions]]
theme = "X"
prompt = "What is the output of if (0)?"
type = "single_choice"
options = ["yes", "no", "error"]
answers = ["no"]
hint = "Zero is false."

[[questions]]
theme = "X"
prompt = "Which loops exist in C?"
type = "checkbox"
options = ["for", "for each", "while", "do while"]
answers = ["for", "while", "do while"]
hint = "No for each."

[[questions]]
theme = "X"
prompt = "sizeof(int[6][7])?"
type = "numeric"
answers = ["168"]
hint = "4 bytes per int."

[[questions]]
theme = "Y"
prompt = "x >>= 1 for x = -8?"
type = "slider"
options = ["-16", "-4", "-8"]
answers = ["-4"]
hint = "Arithmetic shift."

[[questions]]
theme = "Y"
prompt = "Click the bug."
type = "image_click"
image = "images/bug.png"
areas = [{ x = 65, y = 121, width = 57, height = 17 }]
hint = "Look at the if."
"#;

    fn parse(content: &str) -> Result<BankFile> {
        parse_bank_str(content, &PathBuf::from("test.toml"))
    }

    #[test]
    fn parse_valid_toml() {
        let file = parse(VALID_TOML).unwrap();
        assert_eq!(file.name, "Test Bank");
        assert_eq!(file.bank.len(), 5);
        assert_eq!(file.bank.themes(), vec!["X", "Y"]);

        let types: Vec<QuestionType> = file
            .bank
            .questions()
            .iter()
            .map(|q| q.question_type())
            .collect();
        assert_eq!(
            types,
            vec![
                QuestionType::SingleChoice,
                QuestionType::MultiChoice,
                QuestionType::Numeric,
                QuestionType::Slider,
                QuestionType::ImageClick,
            ]
        );
        assert_eq!(file.bank.questions()[4].correct_areas(), &[Rect::new(65, 121, 57, 17)]);
    }

    #[test]
    fn rejects_invalid_slider() {
        let toml = r#"
[bank]
name = "Bad"

[[questions]]
theme = "X"
prompt = "slide"
type = "slider"
options = ["3"]
answers = ["3"]
"#;
        let err = parse(toml).unwrap_err();
        assert!(format!("{err:#}").contains("invalid bounds"), "got: {err:#}");
    }

    #[test]
    fn rejects_answer_outside_options() {
        let toml = r#"
[bank]
name = "Bad"

[[questions]]
theme = "X"
prompt = "pick"
type = "dropdown"
options = ["a", "b"]
answers = ["c"]
"#;
        let err = parse(toml).unwrap_err();
        assert!(format!("{err:#}").contains("question #1"));
    }

    #[test]
    fn rejects_areas_on_text_question() {
        let toml = r#"
[bank]
name = "Bad"

[[questions]]
theme = "X"
prompt = "type"
type = "text"
answers = ["a"]
areas = [{ x = 0, y = 0, width = 1, height = 1 }]
"#;
        assert!(parse(toml).is_err());
    }

    #[test]
    fn rejects_unknown_type() {
        let toml = r#"
[bank]
name = "Bad"

[[questions]]
theme = "X"
prompt = "essay"
type = "essay"
answers = ["a"]
"#;
        let err = parse(toml).unwrap_err();
        assert!(format!("{err:#}").contains("unknown question type"));
    }

    #[test]
    fn parse_malformed_toml() {
        assert!(parse("this is not [valid toml }{").is_err());
    }

    #[test]
    fn validate_reports_content_issues() {
        let toml = r#"
[bank]
name = "Warnings"

[[questions]]
theme = "X"
prompt = "same"
type = "numeric"
answers = ["1"]

[[questions]]
theme = "X"
prompt = "same"
type = "numeric"
answers = ["2"]
hint = "h"

[[questions]]
theme = "X"
prompt = "slide"
type = "slider"
options = ["0", "6"]
answers = ["9", "two"]
hint = "h"
"#;
        let file = parse(toml).unwrap();
        let warnings = validate_bank(&file.bank, None, 12);
        let messages: Vec<&str> = warnings.iter().map(|w| w.message.as_str()).collect();
        assert!(messages.iter().any(|m| m.contains("duplicate")));
        assert!(messages.iter().any(|m| m.contains("no hint")));
        assert!(messages.iter().any(|m| m.contains("outside the slider range")));
        assert!(messages.iter().any(|m| m.contains("not an integer")));
        assert!(messages.iter().any(|m| m.contains("will be shorter")));
    }

    #[test]
    fn validate_checks_images_relative_to_base() {
        let dir = tempfile::tempdir().unwrap();
        let file = parse(VALID_TOML).unwrap();

        let warnings = validate_bank(&file.bank, Some(dir.path()), 1);
        assert!(warnings.iter().any(|w| w.message.contains("image not found")));

        std::fs::create_dir_all(dir.path().join("images")).unwrap();
        std::fs::write(dir.path().join("images/bug.png"), b"png").unwrap();
        let warnings = validate_bank(&file.bank, Some(dir.path()), 1);
        assert!(warnings.is_empty(), "unexpected: {warnings:?}");
    }

    #[test]
    fn builtin_bank_has_no_range_issues() {
        let bank = QuestionBank::builtin();
        let warnings = validate_bank(&bank, None, 12);
        assert!(warnings
            .iter()
            .all(|w| w.message == "no hint provided"), "unexpected: {warnings:?}");
    }

    #[test]
    fn load_directory_merges_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.toml"), VALID_TOML).unwrap();
        std::fs::create_dir_all(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested/b.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("broken.toml"), "nope = [").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let files = load_bank_directory(dir.path()).unwrap();
        assert_eq!(files.len(), 2);

        let bank = load_bank(dir.path()).unwrap();
        assert_eq!(bank.len(), 10);
    }

    #[test]
    fn load_empty_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_bank(dir.path()).is_err());
    }
}
