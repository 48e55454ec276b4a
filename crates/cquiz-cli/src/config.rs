//! User configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use cquiz_stats::StatsStore;

/// Top-level cquiz configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CquizConfig {
    /// Where results are appended. Defaults to `$HOME/quizapp_stats.csv`.
    #[serde(default)]
    pub stats_file: Option<String>,
    /// Questions drawn per quiz.
    #[serde(default = "default_question_count")]
    pub default_question_count: usize,
    /// Quiz time limit in seconds; 0 disables the clock.
    #[serde(default = "default_time_limit_secs")]
    pub default_time_limit_secs: u64,
    /// Audio file looped while a quiz runs.
    #[serde(default)]
    pub music_file: Option<String>,
    /// Player command that reads audio from stdin, e.g. `aplay -q -`.
    #[serde(default)]
    pub music_player: Option<String>,
}

fn default_question_count() -> usize {
    12
}
fn default_time_limit_secs() -> u64 {
    300
}

impl Default for CquizConfig {
    fn default() -> Self {
        Self {
            stats_file: None,
            default_question_count: default_question_count(),
            default_time_limit_secs: default_time_limit_secs(),
            music_file: None,
            music_player: None,
        }
    }
}

impl CquizConfig {
    /// The stats store to use, unless no location is configured and no home
    /// directory is known.
    pub fn stats_store(&self, override_path: Option<&Path>) -> Option<StatsStore> {
        override_path
            .map(Path::to_path_buf)
            .or_else(|| self.stats_file.as_ref().map(PathBuf::from))
            .or_else(StatsStore::default_path)
            .map(StatsStore::new)
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are copied as-is and never scanned again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `cquiz.toml` in the current directory
/// 2. `~/.config/cquiz/config.toml`
///
/// `CQUIZ_STATS_FILE` overrides `stats_file`.
pub fn load_config_from(path: Option<&Path>) -> Result<CquizConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("cquiz.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<CquizConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            config
        }
        None => CquizConfig::default(),
    };

    if let Ok(stats_file) = std::env::var("CQUIZ_STATS_FILE") {
        config.stats_file = Some(stats_file);
    }

    config.stats_file = config.stats_file.as_deref().map(resolve_env_vars);
    config.music_file = config.music_file.as_deref().map(resolve_env_vars);
    config.music_player = config.music_player.as_deref().map(resolve_env_vars);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("cquiz"))
}
