//! cquiz CLI — timed C programming quizzes in the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod config;
mod music;
mod render;

#[derive(Parser)]
#[command(name = "cquiz", version, about = "Timed C programming quizzes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a quiz
    Play {
        /// Theme name or number (asked interactively when omitted)
        #[arg(long)]
        theme: Option<String>,

        /// Number of questions (default from config: 12)
        #[arg(long)]
        count: Option<usize>,

        /// Time limit in seconds, 0 for no limit (default from config: 300)
        #[arg(long)]
        time_limit: Option<u64>,

        /// Path to a .toml question bank or directory (default: built-in questions)
        #[arg(long)]
        bank: Option<PathBuf>,

        /// Seed for reproducible question order
        #[arg(long)]
        seed: Option<u64>,

        /// Stats CSV file to append the result to
        #[arg(long)]
        stats_file: Option<PathBuf>,

        /// Do not play background music
        #[arg(long)]
        no_music: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List available themes
    Themes {
        /// Path to a .toml question bank or directory
        #[arg(long)]
        bank: Option<PathBuf>,
    },

    /// Show past results
    History {
        /// Stats CSV file to read
        #[arg(long)]
        stats_file: Option<PathBuf>,

        /// Print as JSON
        #[arg(long)]
        json: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate question bank TOML files
    Validate {
        /// Path to a bank file or directory (default: built-in questions)
        #[arg(long)]
        bank: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and example question bank
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cquiz=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play {
            theme,
            count,
            time_limit,
            bank,
            seed,
            stats_file,
            no_music,
            config,
        } => {
            commands::play::execute(commands::play::PlayOptions {
                theme,
                count,
                time_limit,
                bank,
                seed,
                stats_file,
                no_music,
                config,
            })
            .await
        }
        Commands::Themes { bank } => commands::themes::execute(bank),
        Commands::History {
            stats_file,
            json,
            config,
        } => commands::history::execute(stats_file, json, config),
        Commands::Validate { bank, config } => commands::validate::execute(bank, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
