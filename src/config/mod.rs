pub mod model;
pub mod nickname;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub use model::{AppConfig, ConnectionConfig, LoggingConfig};

fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("crabbot")
        .join("config.toml")
}

/// Load configuration from `path`, or from the default location.
///
/// A missing file at the default location yields defaults; a missing file
/// that was asked for explicitly is an error.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => read_config(path)?,
        None => {
            let path = config_path();
            if !path.exists() {
                AppConfig::default()
            } else {
                read_config(&path)?
            }
        }
    };
    config.validate()?;
    Ok(config)
}

fn read_config(path: &Path) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let config: AppConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(config)
}
