use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Default location of the bot configuration.
pub const CONFIG_PATH: &str = "config/bot.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Everything the bot reads from `config/bot.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Discord bot token.
    pub token: String,
    /// Command prefix, e.g. `g?`.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// User id allowed to run `restart`.
    pub owner: u64,
    /// Where the participant list is persisted.
    #[serde(default = "default_store")]
    pub store: PathBuf,
    /// Optional "streaming" presence shown once the bot is ready.
    pub stream: Option<StreamConf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamConf {
    pub name: String,
    pub url: String,
}

fn default_prefix() -> String {
    "g?".to_string()
}

fn default_store() -> PathBuf {
    PathBuf::from("participants.json")
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.to_path_buf(),
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })
    }
}
