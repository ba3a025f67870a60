//! Config sources: an optional TOML file and `VIEWQUERY__*` environment variables.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, Environment, File, FileFormat};
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

pub const ENV_PREFIX: &str = "VIEWQUERY";
pub const ENV_SEPARATOR: &str = "__";

/// Add `path` as a TOML source. A missing file is skipped with a warning.
pub fn add_file(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if !path.exists() {
        warn!(config_path = %path.display(), "Configuration file not found, using defaults");
        return Ok(builder);
    }
    Ok(builder.add_source(File::from(path).format(FileFormat::Toml).required(true)))
}

/// Add environment overrides, e.g. `VIEWQUERY__REFRESH__SKIP_UNCHANGED=false`.
///
/// `source` replaces the process environment when given.
pub fn add_environment(
    builder: ConfigBuilder<DefaultState>,
    source: Option<HashMap<String, String>>,
) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true)
            .source(source),
    )
}
