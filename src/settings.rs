use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PassbookError, Result};

/// Tunable constants of the extraction heuristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Largest balance mismatch still treated as agreement.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Read ambiguous numeric dates (02/01/2024) as day-month.
    #[serde(default = "default_day_first")]
    pub day_first: bool,
    /// Vertical bucket size for grouping positioned words into lines.
    #[serde(default = "default_line_bucket")]
    pub line_bucket: f64,
    /// Rows an extraction strategy must yield to win.
    #[serde(default = "default_min_rows")]
    pub min_rows: usize,
    /// Rows sampled when guessing date and numeric columns.
    #[serde(default = "default_sample_rows")]
    pub sample_rows: usize,
}

fn default_tolerance() -> f64 {
    0.01
}

fn default_day_first() -> bool {
    true
}

fn default_line_bucket() -> f64 {
    5.0
}

fn default_min_rows() -> usize {
    2
}

fn default_sample_rows() -> usize {
    10
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            day_first: default_day_first(),
            line_bucket: default_line_bucket(),
            min_rows: default_min_rows(),
            sample_rows: default_sample_rows(),
        }
    }
}

pub const KEYS: &[&str] = &["tolerance", "day_first", "line_bucket", "min_rows", "sample_rows"];

impl Settings {
    /// Update one key from its textual value, validating the range.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let invalid = |what: &str| PassbookError::Settings(format!("{key}: expected {what}, got {value:?}"));
        match key {
            "tolerance" => {
                let v: f64 = value.parse().map_err(|_| invalid("a number"))?;
                if !(v.is_finite() && v > 0.0) {
                    return Err(invalid("a positive number"));
                }
                self.tolerance = v;
            }
            "day_first" => {
                self.day_first = value.parse().map_err(|_| invalid("true or false"))?;
            }
            "line_bucket" => {
                let v: f64 = value.parse().map_err(|_| invalid("a number"))?;
                if !(v.is_finite() && v > 0.0) {
                    return Err(invalid("a positive number"));
                }
                self.line_bucket = v;
            }
            "min_rows" => {
                let v: usize = value.parse().map_err(|_| invalid("a whole number"))?;
                if v == 0 {
                    return Err(invalid("at least 1"));
                }
                self.min_rows = v;
            }
            "sample_rows" => {
                let v: usize = value.parse().map_err(|_| invalid("a whole number"))?;
                if v == 0 {
                    return Err(invalid("at least 1"));
                }
                self.sample_rows = v;
            }
            _ => {
                return Err(PassbookError::Settings(format!(
                    "unknown key {key:?} (known: {})",
                    KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("passbook")
}

pub fn default_settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

/// Load settings, falling back to defaults when the file is missing or unreadable.
pub fn load_settings(path: &Path) -> Settings {
    if !path.exists() {
        return Settings::default();
    }
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cannot read settings, using defaults");
            return Settings::default();
        }
    };
    serde_json::from_str(&content).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "invalid settings, using defaults");
        Settings::default()
    })
}

pub fn save_settings(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| PassbookError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}
