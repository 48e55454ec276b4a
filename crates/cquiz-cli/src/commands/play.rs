//! The `cquiz play` command.

use std::io::BufRead;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use cquiz_core::bank::QuestionBank;
use cquiz_core::clock::{format_remaining, ClockEvent, SessionClock};
use cquiz_core::grader::{grade, ClickTracker, Response};
use cquiz_core::session::QuizSession;

use crate::config::load_config_from;
use crate::music::BackgroundMusic;
use crate::render::{self, Input};

/// Options for one quiz run.
#[derive(Debug, Clone, Default)]
pub struct PlayOptions {
    /// Theme name or 1-based number; asked for interactively when missing.
    pub theme: Option<String>,
    pub count: Option<usize>,
    pub time_limit: Option<u64>,
    pub bank: Option<PathBuf>,
    pub seed: Option<u64>,
    pub stats_file: Option<PathBuf>,
    pub no_music: bool,
    pub config: Option<PathBuf>,
}

/// Remaining seconds at which a reminder is printed.
const REMINDERS: [u64; 3] = [60, 30, 10];

enum Event {
    Line(Option<String>),
    Clock(Option<ClockEvent>),
}

pub async fn execute(opts: PlayOptions) -> Result<()> {
    let config = load_config_from(opts.config.as_deref())?;
    let bank = super::load_questions(opts.bank.as_deref())?;
    let mut lines = spawn_stdin_reader();

    let theme = match opts.theme {
        Some(t) => resolve_theme(&bank, &t)?,
        None => choose_theme(&bank, &mut lines).await?,
    };
    let requested = opts.count.unwrap_or(config.default_question_count);
    let time_limit = opts.time_limit.unwrap_or(config.default_time_limit_secs);

    let mut session = match opts.seed {
        Some(seed) => QuizSession::seeded(bank.questions(), seed),
        None => QuizSession::new(bank.questions()),
    };
    session.start_session(&theme, requested, time_limit)?;

    if session.question_count() < requested {
        println!(
            "Note: \"{theme}\" has only {} question(s); playing all of them.",
            session.question_count()
        );
    }
    if time_limit > 0 {
        println!("You have {} to finish.", format_remaining(time_limit));
    }

    let music = match (&config.music_file, &config.music_player) {
        (Some(file), Some(player)) if !opts.no_music => {
            match BackgroundMusic::start(PathBuf::from(file), player) {
                Ok(m) => Some(m),
                Err(e) => {
                    tracing::warn!("background music disabled: {e:#}");
                    None
                }
            }
        }
        _ => None,
    };

    let mut clock = (time_limit > 0).then(|| SessionClock::start(time_limit));
    let mut hints_used = 0u32;
    let mut remaining = time_limit;

    'questions: while let Some(question) = session.current_question() {
        print!(
            "{}",
            render::render_question(question, session.current_index(), session.question_count())
        );
        if clock.is_some() {
            println!("Time left: {}", format_remaining(remaining));
        }
        let mut clicks = ClickTracker::new();

        let response: Response = loop {
            let event = tokio::select! {
                line = lines.recv() => Event::Line(line.transpose().context("failed to read input")?),
                tick = next_clock_event(&mut clock) => Event::Clock(tick),
            };

            match event {
                Event::Line(None) => {
                    tracing::debug!("input closed, ending quiz");
                    break 'questions;
                }
                Event::Line(Some(line)) => match render::parse_input(question, &line) {
                    Ok(Input::Answer(response)) => break response,
                    Ok(Input::Submit) => break clicks.response(),
                    Ok(Input::Click(point)) => {
                        clicks.click(point);
                        println!(
                            "Click at ({}, {}) recorded. Press Enter to submit.",
                            point.x, point.y
                        );
                    }
                    Ok(Input::Hint) => match question.hint() {
                        Some(hint) => {
                            hints_used += 1;
                            println!("Hint: {hint}");
                        }
                        None => println!("No hint available for this question."),
                    },
                    Ok(Input::Quit) => break 'questions,
                    Err(message) => println!("{message}"),
                },
                Event::Clock(Some(ClockEvent::Tick { remaining: left })) => {
                    remaining = left;
                    if REMINDERS.contains(&left) {
                        println!("Time left: {}", format_remaining(left));
                    }
                }
                Event::Clock(Some(ClockEvent::Expired)) | Event::Clock(None) => {
                    println!("\nTime's up!");
                    let held = render::held_response(question, clicks.last());
                    session.submit(&grade(question, &held))?;
                    clock = None;
                    break 'questions;
                }
            }
        };

        let graded = grade(question, &response);
        println!("{}", if graded.is_correct { "Correct!" } else { "Wrong." });
        session.submit(&graded)?;

        if !session.advance()? {
            break;
        }
    }

    drop(clock);
    session.finish()?;
    if let Some(music) = music {
        music.stop().await;
    }

    let summary = session.summary(hints_used)?;
    print!("{}", render::render_summary(&summary));

    match config.stats_store(opts.stats_file.as_deref()) {
        Some(store) => {
            if store.append_logged(&summary) {
                println!("Result saved to {}", store.path().display());
            }
        }
        None => tracing::warn!("no stats file configured and no home directory found, result not saved"),
    }

    let review = session.review();
    if !review.is_empty() {
        println!("\nYour answers:\n{}", render::review_table(&review));
    }

    Ok(())
}

/// Forward stdin lines from a dedicated thread.
///
/// A blocked read on this thread does not hold the runtime open, so the
/// process can exit when the clock ends the quiz while input is pending.
fn spawn_stdin_reader() -> mpsc::Receiver<std::io::Result<String>> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Wait for the next clock event, or forever when the quiz is untimed.
async fn next_clock_event(clock: &mut Option<SessionClock>) -> Option<ClockEvent> {
    match clock {
        Some(c) => c.next_event().await,
        None => std::future::pending().await,
    }
}

/// Match a theme by 1-based number or case-insensitive name.
fn resolve_theme(bank: &QuestionBank, input: &str) -> Result<String> {
    let themes = bank.themes();
    let input = input.trim();

    if let Some(theme) = input
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| themes.get(i))
    {
        return Ok(theme.to_string());
    }

    themes
        .iter()
        .find(|t| t.eq_ignore_ascii_case(input))
        .map(|t| t.to_string())
        .with_context(|| format!("unknown theme '{input}' (available: {})", themes.join(", ")))
}

async fn choose_theme(
    bank: &QuestionBank,
    lines: &mut mpsc::Receiver<std::io::Result<String>>,
) -> Result<String> {
    println!("Choose a theme:");
    for (i, theme) in bank.themes().iter().enumerate() {
        println!("  {}) {}", i + 1, theme);
    }

    loop {
        let Some(line) = lines.recv().await.transpose().context("failed to read input")? else {
            anyhow::bail!("no theme selected");
        };
        match resolve_theme(bank, &line) {
            Ok(theme) => return Ok(theme),
            Err(e) => println!("{e}"),
        }
    }
}
