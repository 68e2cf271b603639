//! Board configuration, fixed when a whiteboard is constructed.

use crate::history::DEFAULT_MAX_HISTORY;
use crate::tools::{DEFAULT_LINE_WIDTH, ERASER_WIDTH, MAX_LINE_WIDTH, MIN_LINE_WIDTH};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("max_history must be at least 1")]
    ZeroMaxHistory,
    #[error("Invalid line width setting: {0}")]
    InvalidLineWidth(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

/// What happens to a stroke in progress when the pointer leaves the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeavePolicy {
    /// Finish the stroke as drawn so far and record it.
    #[default]
    Commit,
    /// Abandon the stroke like a cancel.
    Discard,
}

/// Whiteboard settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Maximum number of snapshots kept for undo.
    pub max_history: usize,
    /// Initial pen width.
    pub default_line_width: f64,
    /// Eraser width.
    pub eraser_width: f64,
    pub min_line_width: f64,
    pub max_line_width: f64,
    pub leave_policy: LeavePolicy,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_MAX_HISTORY,
            default_line_width: DEFAULT_LINE_WIDTH,
            eraser_width: ERASER_WIDTH,
            min_line_width: MIN_LINE_WIDTH,
            max_line_width: MAX_LINE_WIDTH,
            leave_policy: LeavePolicy::Commit,
        }
    }
}

impl BoardConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded board config from {}", path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Check that the settings are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_history == 0 {
            return Err(ConfigError::ZeroMaxHistory);
        }
        let widths = [
            ("min_line_width", self.min_line_width),
            ("max_line_width", self.max_line_width),
            ("default_line_width", self.default_line_width),
            ("eraser_width", self.eraser_width),
        ];
        for (name, width) in widths {
            if !width.is_finite() || width <= 0.0 {
                return Err(ConfigError::InvalidLineWidth(format!(
                    "{} must be a positive number, got {}",
                    name, width
                )));
            }
        }
        if self.min_line_width > self.max_line_width {
            return Err(ConfigError::InvalidLineWidth(format!(
                "min_line_width {} exceeds max_line_width {}",
                self.min_line_width, self.max_line_width
            )));
        }
        Ok(())
    }
}
