use std::path::Path;
use tracing::info;

use crate::error::FixplsError;
use crate::models::{Config, ConfigError, ConfigOverrides};

/// Load configuration from the working directory with CLI overrides
pub fn load_config(project_root: &Path, overrides: ConfigOverrides) -> Result<Config, FixplsError> {
    let config = Config::load_from_dir(project_root)?;
    let config = config.with_overrides(overrides);

    if config.repair.max_iterations == 0 {
        return Err(ConfigError::ZeroIterations.into());
    }

    info!(
        "Configuration loaded: model={}, url={}, max_iterations={}",
        config.completion.model, config.completion.url, config.repair.max_iterations
    );

    Ok(config)
}
