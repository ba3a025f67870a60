//! Layered configuration loading

use crate::config::{defaults, sources, EngineConfig};
use crate::error::QueryError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads [`EngineConfig`]: defaults, then an optional TOML file, then
/// environment overrides.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    env: Option<HashMap<String, String>>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Read overrides from `vars` instead of the process environment.
    pub fn with_env(mut self, vars: HashMap<String, String>) -> Self {
        self.env = Some(vars);
        self
    }

    pub fn load(&self) -> Result<EngineConfig, QueryError> {
        let mut builder = defaults::builder_with_defaults()?;
        if let Some(path) = &self.file {
            builder = sources::add_file(builder, path)?;
        }
        builder = sources::add_environment(builder, self.env.clone());

        let config: EngineConfig = builder.build()?.try_deserialize()?;
        config.validate().map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            QueryError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                messages.join("\n")
            ))
        })?;
        debug!(?config.refresh, "Loaded configuration");
        Ok(config)
    }

    /// Defaults with process environment overrides.
    pub fn from_env() -> Result<EngineConfig, QueryError> {
        Self::new().load()
    }
}
