use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Config file name looked up in the working directory and then in the home
/// directory.
const CONFIG_FILE_NAME: &str = ".graytail.toml";

/// Connection settings for the Graylog REST API.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub uri: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
}

/// The paths tried when no `--config` flag is given, in order.
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(CONFIG_FILE_NAME));
    }
    paths
}

/// Load configuration from the first readable path. Every path failing to
/// read, or the winning file lacking a server uri, is fatal.
pub fn load(paths: &[PathBuf]) -> Result<Config> {
    let contents = paths
        .iter()
        .find_map(|path| std::fs::read_to_string(path).ok())
        .ok_or_else(|| {
            let tried: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
            Error::Config(format!("could not read any of: {}", tried.join(", ")))
        })?;

    let mut config: Config =
        toml::from_str(&contents).map_err(|e| Error::Config(e.to_string()))?;

    if config.server.uri.trim().is_empty() {
        return Err(Error::Config("server uri is empty".to_string()));
    }

    // Keep URL concatenation honest regardless of how the uri was written.
    config.server.uri = config.server.uri.trim_end_matches('/').to_string();

    Ok(config)
}
