//! Default values seeded into the config builder before any source.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("refresh.skip_unchanged", true)?
        .set_default("refresh.track_static", true)?
        .set_default("logging.level", "warn")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")?
        .set_default("logging.file", "viewquery.log")?
        .set_default("logging.color", true)
}
