//! Configuration
//!
//! Engine settings with serde defaults, loadable from an optional TOML file and
//! `VIEWQUERY__*` environment overrides through [`ConfigLoader`].

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

mod defaults;
mod loader;
mod sources;

pub use loader::ConfigLoader;

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub refresh: RefreshConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Refresh short-circuiting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Skip a refresh when the list is clean and the tree revision it was
    /// computed at is unchanged
    #[serde(default = "default_true")]
    pub skip_unchanged: bool,

    /// Stamp static queries with their scope view's revision instead of the
    /// whole tree's
    #[serde(default = "default_true")]
    pub track_static: bool,
}

fn default_true() -> bool {
    true
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            skip_unchanged: true,
            track_static: true,
        }
    }
}

impl RefreshConfig {
    /// Recompute every query on every refresh.
    pub fn always() -> Self {
        Self {
            skip_unchanged: false,
            track_static: false,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.track_static && !self.skip_unchanged {
            return Err("track_static has no effect unless skip_unchanged is enabled".to_string());
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Refresh(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Refresh(msg) => write!(f, "Refresh: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if let Err(e) = self.refresh.validate() {
            errors.push(ValidationError::Refresh(e));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
