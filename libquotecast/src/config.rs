//! Configuration management for Quotecast
//!
//! Settings are resolved in three layers: built-in defaults, then the TOML
//! config file, then CLI overrides. The file wins over defaults, the CLI
//! wins over the file.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ConfigError, Result};

pub const DEFAULT_MAX_SENTS: usize = 3;
pub const DEFAULT_MAX_CHARS: usize = 500;
pub const DEFAULT_MAX_RETRIES: u32 = 10;
pub const DEFAULT_PENALIZE: f64 = 2.0;
pub const DEFAULT_BACKOFF_CAP: Duration = Duration::from_secs(30);

/// Raw configuration file contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Handle of the posting account, used to mention-prefix reply chunks
    pub username: Option<String>,

    /// Authors to sample from
    #[serde(default)]
    pub authors: Vec<String>,

    /// Mastodon-compatible instance URL
    pub instance: Option<String>,

    /// Path to the posting-history file (`~` is expanded)
    pub hist_file: Option<String>,

    /// Reject quotes with more sentences than this
    pub max_sents: Option<usize>,

    /// Reject quotes longer than this many characters
    pub max_chars: Option<usize>,

    /// Give up after this many skipped attempts
    pub max_retries: Option<u32>,

    /// How aggressively repeated use lowers sampling weight
    pub penalize: Option<f64>,

    /// Upper bound on the between-attempt wait, e.g. "30s"
    pub backoff_cap: Option<String>,

    pub tokens: Option<Tokens>,
}

/// API credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tokens {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: Option<String>,
    pub access_token_secret: Option<String>,
}

/// Per-invocation overrides, typically sourced from CLI flags
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub hist_file: Option<String>,
    pub max_sents: Option<usize>,
    pub max_chars: Option<usize>,
    pub max_retries: Option<u32>,
    pub penalize: Option<f64>,
}

/// Fully resolved settings, ready to construct the poster from
#[derive(Debug, Clone)]
pub struct Settings {
    pub username: Option<String>,
    pub authors: Vec<String>,
    pub instance: String,
    pub hist_file: PathBuf,
    pub max_sents: usize,
    pub max_chars: usize,
    pub max_retries: u32,
    pub penalize: f64,
    pub backoff_cap: Duration,
    pub access_token: Option<String>,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    /// Validate requirements and apply defaults and overrides
    pub fn resolve(self, overrides: &Overrides) -> Result<Settings> {
        let tokens = self
            .tokens
            .ok_or_else(|| ConfigError::MissingField("tokens".to_string()))?;
        if tokens.consumer_key.trim().is_empty() {
            return Err(ConfigError::MissingField("tokens.consumer_key".to_string()).into());
        }
        if tokens.consumer_secret.trim().is_empty() {
            return Err(ConfigError::MissingField("tokens.consumer_secret".to_string()).into());
        }

        let backoff_cap = match &self.backoff_cap {
            Some(raw) => humantime::parse_duration(raw).map_err(|e| ConfigError::InvalidValue {
                field: "backoff_cap".to_string(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_BACKOFF_CAP,
        };

        let hist_file = overrides
            .hist_file
            .clone()
            .or(self.hist_file)
            .map(|p| PathBuf::from(shellexpand::tilde(&p).to_string()))
            .map(Ok)
            .unwrap_or_else(default_hist_file)?;

        Ok(Settings {
            username: self.username,
            authors: self.authors,
            instance: self
                .instance
                .unwrap_or_else(|| "https://mastodon.social".to_string()),
            hist_file,
            max_sents: overrides
                .max_sents
                .or(self.max_sents)
                .unwrap_or(DEFAULT_MAX_SENTS),
            max_chars: overrides
                .max_chars
                .or(self.max_chars)
                .unwrap_or(DEFAULT_MAX_CHARS),
            max_retries: overrides
                .max_retries
                .or(self.max_retries)
                .unwrap_or(DEFAULT_MAX_RETRIES),
            penalize: overrides
                .penalize
                .or(self.penalize)
                .unwrap_or(DEFAULT_PENALIZE),
            backoff_cap,
            access_token: tokens.access_token,
        })
    }
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("QUOTECAST_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("quotecast").join("config.toml"))
}

/// Default history file location under the XDG data directory
fn default_hist_file() -> Result<PathBuf> {
    let data_dir =
        dirs::data_dir().ok_or_else(|| ConfigError::MissingField("data directory".to_string()))?;

    Ok(data_dir.join("quotecast").join("history"))
}
