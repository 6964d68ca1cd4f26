use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::AppConfig;

const CONFIG_DIR: &str = "lazydog";
const CONFIG_FILE: &str = "config.toml";

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Load the config from `path`, or from the default location when `None`.
///
/// A missing file yields the defaults; a file that exists but does not
/// parse is an error.
pub fn load(path: Option<&Path>) -> color_eyre::Result<AppConfig> {
    let Some(path) = path.map(Path::to_path_buf).or_else(config_path) else {
        debug!("No config directory found, using defaults");
        return Ok(AppConfig::default());
    };

    if !path.exists() {
        debug!(?path, "Config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(&path)?;
    let config = parse(&content)?;
    debug!(?path, "Loaded config");
    Ok(config)
}

pub fn parse(content: &str) -> color_eyre::Result<AppConfig> {
    Ok(toml::from_str(content)?)
}
