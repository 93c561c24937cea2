//! Configuration management for boardview
//!
//! Configuration is loaded from environment variables, falling back to a
//! `.env` file in the working directory.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::time::{now_utc, parse_instant};

/// How listings are rendered by front ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl OutputFormat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Json => "json",
        }
    }
}

/// Main configuration struct for boardview
#[derive(Debug, Clone)]
pub struct Config {
    pub output_format: OutputFormat,
    /// Fixed "now" used for overdue checks; `None` reads the wall clock.
    pub now_override: Option<NaiveDateTime>,
    /// Fallback `tracing` directive when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Base directory for relative fixture paths.
    pub data_dir: Option<PathBuf>,
    /// Max rows printed by table output. 0 = unlimited.
    pub table_limit: usize,
    /// Bold table headers when stdout is a terminal.
    pub color: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Table,
            now_override: None,
            log_filter: "warn".to_string(),
            data_dir: None,
            table_limit: 0,
            color: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(v) = env_value("BOARDVIEW_OUTPUT") {
            config.output_format = match v.trim().to_lowercase().as_str() {
                "json" => OutputFormat::Json,
                _ => OutputFormat::Table,
            };
        }
        if let Some(v) = env_value("BOARDVIEW_NOW") {
            match parse_instant(&v) {
                Ok(now) => config.now_override = Some(now),
                Err(err) => tracing::warn!(value = %v, error = %err, "ignoring BOARDVIEW_NOW"),
            }
        }
        if let Some(v) = env_value("BOARDVIEW_LOG") {
            let trimmed = v.trim();
            if !trimmed.is_empty() {
                config.log_filter = trimmed.to_string();
            }
        }
        if let Some(v) = env_value("BOARDVIEW_DATA_DIR") {
            let trimmed = v.trim();
            if !trimmed.is_empty() {
                config.data_dir = Some(PathBuf::from(trimmed));
            }
        }
        config.table_limit = env_usize("BOARDVIEW_TABLE_LIMIT", config.table_limit);
        config.color = env_bool("BOARDVIEW_COLOR", config.color);

        config
    }

    /// The snapshot used for one computation pass.
    #[must_use]
    pub fn now(&self) -> NaiveDateTime {
        self.now_override.unwrap_or_else(now_utc)
    }

    /// Resolve a fixture path against `data_dir` when it is relative.
    #[must_use]
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.data_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

// Helper functions for environment variable parsing

static DOTENV_VALUES: OnceLock<HashMap<String, String>> = OnceLock::new();

#[cfg(test)]
thread_local! {
    static TEST_ENV_OVERRIDES: std::cell::RefCell<HashMap<String, String>> =
        std::cell::RefCell::new(HashMap::new());
}

#[cfg(test)]
fn test_env_override_value(key: &str) -> Option<String> {
    TEST_ENV_OVERRIDES.with(|cell| cell.borrow().get(key).cloned())
}

fn dotenv_values() -> &'static HashMap<String, String> {
    DOTENV_VALUES.get_or_init(|| {
        fs::read_to_string(".env")
            .map(|contents| parse_dotenv_contents(&contents))
            .unwrap_or_default()
    })
}

/// Read a value from the environment first, falling back to `.env`.
#[must_use]
pub fn env_value(key: &str) -> Option<String> {
    #[cfg(test)]
    if let Some(v) = test_env_override_value(key) {
        return Some(v);
    }
    env::var(key).ok().or_else(|| dotenv_values().get(key).cloned())
}

/// Parse `KEY=value` lines. Blank lines, `#` comments and an optional
/// `export ` prefix are ignored; matching outer quotes are stripped.
#[must_use]
pub fn parse_dotenv_contents(contents: &str) -> HashMap<String, String> {
    let mut out = HashMap::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, raw)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        out.insert(key.to_string(), unquote(raw.trim()).to_string());
    }
    out
}

fn unquote(raw: &str) -> &str {
    for quote in ['"', '\''] {
        if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
            return &raw[1..raw.len() - 1];
        }
    }
    raw
}

fn parse_bool(value: &str, default: bool) -> bool {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" => true,
        "0" | "false" | "f" | "no" | "n" => false,
        _ => default,
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    env_value(key).map_or(default, |v| parse_bool(&v, default))
}

fn env_usize(key: &str, default: usize) -> usize {
    env_value(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
