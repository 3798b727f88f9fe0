//! Dashboard configuration and the persisted API base URL preference.
//!
//! Values are layered: TOML file, then `FARMVIBES_*` environment variables
//! (a `.env` file is honoured), then built-in defaults. A `--api-url` flag
//! on the command line beats all of them.

use reqwest::Url;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::version::API_VERSION;

pub const DEFAULT_CONFIG_PATH: &str = "dashboard_config.toml";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const ENV_PREFIX: &str = "FARMVIBES_";
const API_URL_KEY: &str = "api_url";

pub fn default_api_url() -> String {
    format!("http://localhost:31108/{API_VERSION}")
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file at {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse TOML from config file at {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to load config from environment: {0}")]
    Env(#[from] envy::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Failed to write config file at {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid API URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Where the effective API URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlSource {
    Default,
    File,
    Environment,
    CommandLine,
}

impl UrlSource {
    /// Environment and command-line URLs cannot be changed from the settings page.
    pub fn is_fixed(&self) -> bool {
        matches!(self, UrlSource::Environment | UrlSource::CommandLine)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub api_url: String,
    pub api_url_source: UrlSource,
    pub log_dir: String,
    pub request_timeout_secs: u64,
    pub config_path: PathBuf,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
struct PartialDashboardConfig {
    api_url: Option<String>,
    log_dir: Option<String>,
    request_timeout_secs: Option<u64>,
}

fn read_file_layer(path: &Path) -> Result<PartialDashboardConfig, ConfigError> {
    if !path.exists() {
        debug!(path = ?path, "Config file not found, using defaults.");
        return Ok(PartialDashboardConfig::default());
    }
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl DashboardConfig {
    pub fn load(config_path: &Path) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::load_from(config_path, std::env::vars())
    }

    /// Same as [`DashboardConfig::load`] with an explicit environment.
    pub fn load_from<I>(config_path: &Path, env: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let file_config = read_file_layer(config_path)?;
        let env_config: PartialDashboardConfig = envy::prefixed(ENV_PREFIX).from_iter(env)?;

        let (api_url, api_url_source) = match (env_config.api_url, file_config.api_url) {
            (Some(url), _) => (url, UrlSource::Environment),
            (None, Some(url)) => (url, UrlSource::File),
            (None, None) => (default_api_url(), UrlSource::Default),
        };

        let config = DashboardConfig {
            api_url: normalize_api_url(&api_url)?,
            api_url_source,
            log_dir: env_config
                .log_dir
                .or(file_config.log_dir)
                .unwrap_or_else(|| DEFAULT_LOG_DIR.to_string()),
            request_timeout_secs: env_config
                .request_timeout_secs
                .or(file_config.request_timeout_secs)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            config_path: config_path.to_path_buf(),
        };
        Ok(config)
    }

    pub fn override_api_url(&mut self, url: &str) -> Result<(), ConfigError> {
        self.api_url = normalize_api_url(url)?;
        self.api_url_source = UrlSource::CommandLine;
        Ok(())
    }
}

/// Trims whitespace and trailing slashes and checks for an http(s) URL.
pub fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let invalid = |reason: String| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };
    let parsed = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}

fn read_table(path: &Path) -> Result<toml::Table, ConfigError> {
    let existing = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    existing
        .parse::<toml::Table>()
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

fn write_table(path: &Path, table: &toml::Table) -> Result<(), ConfigError> {
    let updated = toml::to_string_pretty(table)?;
    fs::write(path, updated).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Persists the API URL preference, keeping every other key in the file.
pub fn save_api_url(path: &Path, url: &str) -> Result<String, ConfigError> {
    let url = normalize_api_url(url)?;
    let mut table = read_table(path)?;
    table.insert(API_URL_KEY.to_string(), toml::Value::String(url.clone()));
    write_table(path, &table)?;
    info!(path = ?path, api_url = %url, "Saved API URL preference.");
    Ok(url)
}

/// Drops the persisted API URL so the default applies again.
pub fn reset_api_url(path: &Path) -> Result<(), ConfigError> {
    if !path.exists() {
        return Ok(());
    }
    let mut table = read_table(path)?;
    if table.remove(API_URL_KEY).is_some() {
        write_table(path, &table)?;
        info!(path = ?path, "Removed API URL preference.");
    }
    Ok(())
}
