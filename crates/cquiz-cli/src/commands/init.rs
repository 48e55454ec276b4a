//! The `cquiz init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create cquiz.toml
    if Path::new("cquiz.toml").exists() {
        println!("cquiz.toml already exists, skipping.");
    } else {
        std::fs::write("cquiz.toml", SAMPLE_CONFIG)?;
        println!("Created cquiz.toml");
    }

    // Create example bank
    std::fs::create_dir_all("banks")?;
    let example_path = Path::new("banks/example.toml");
    if example_path.exists() {
        println!("banks/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_BANK)?;
        println!("Created banks/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit cquiz.toml to set your stats file, time limit and music");
    println!("  2. Run: cquiz validate --bank banks/example.toml");
    println!("  3. Run: cquiz play --bank banks/example.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# cquiz configuration

# Results are appended here, one CSV line per finished quiz.
stats_file = "${HOME}/quizapp_stats.csv"

default_question_count = 12

# Seconds per quiz; 0 turns the clock off.
default_time_limit_secs = 300

# Optional background music, streamed to the player's stdin.
# music_file = "music/loop.wav"
# music_player = "aplay -q -"
"#;

const EXAMPLE_BANK: &str = r#"[bank]
name = "Example Bank"
description = "A few questions to show every question type"

[[questions]]
theme = "Basics"
prompt = "What does printf(\"%d\", 7 / 2); print?"
type = "single_choice"
options = ["3", "3.5", "4"]
answers = ["3"]
hint = "Integer division truncates."

[[questions]]
theme = "Basics"
prompt = "Which of these are C keywords?"
type = "multi_choice"
options = ["static", "final", "volatile", "var"]
answers = ["static", "volatile"]
hint = "Two of them come from other languages."

[[questions]]
theme = "Basics"
prompt = "What is sizeof(char)?"
type = "numeric"
answers = ["1"]
hint = "It is 1 by definition."

[[questions]]
theme = "Basics"
prompt = "Which header declares malloc?"
type = "free_text"
answers = ["stdlib.h", "<stdlib.h>"]
hint = "Standard library."

[[questions]]
theme = "Basics"
prompt = "What is 1 << 3?"
type = "dropdown"
options = ["3", "4", "8", "16"]
answers = ["8"]
hint = "Each shift doubles."

[[questions]]
theme = "Basics"
prompt = "How many bits are in a byte on any mainstream platform?"
type = "slider"
options = ["0", "16", "4"]
answers = ["8"]
hint = "CHAR_BIT."

# [[questions]]
# theme = "Basics"
# prompt = "Click on the line containing the bug."
# type = "image_click"
# image = "images/bug.png"
# areas = [{ x = 65, y = 121, width = 57, height = 17 }]
# hint = "Look at the condition."
"#;
