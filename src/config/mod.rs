//! Configuration module for storedesk
//!
//! Manages the backend location, session token, default views and logging.
//! Configuration is stored in the user's config directory and can be
//! overridden with `STOREDESK_*` environment variables
//! (`STOREDESK_VIEW_LATENCY__CREATE_MS` for nested keys).

mod setup;

pub use setup::first_time_setup;

use crate::views::Latency;
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_LOG_FILTER: &str = "storedesk=info";

/// Confirmation delays for saved-view changes, in milliseconds
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct ViewLatency {
    #[serde(default = "default_create_ms")]
    pub create_ms: u64,
    #[serde(default = "default_mutate_ms")]
    pub mutate_ms: u64,
}

const fn default_create_ms() -> u64 {
    500
}

const fn default_mutate_ms() -> u64 {
    1
}

impl Default for ViewLatency {
    fn default() -> Self {
        Self {
            create_ms: default_create_ms(),
            mutate_ms: default_mutate_ms(),
        }
    }
}

impl From<ViewLatency> for Latency {
    fn from(latency: ViewLatency) -> Self {
        Self {
            create: Duration::from_millis(latency.create_ms),
            mutate: Duration::from_millis(latency.mutate_ms),
        }
    }
}

/// Application configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct StoredeskConfig {
    /// Root URL of the storefront backend
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token forwarded with every request
    #[serde(default)]
    pub session_token: Option<String>,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Initial view tabs; the first one is the locked default
    #[serde(default = "default_views")]
    pub default_views: Vec<String>,

    #[serde(default)]
    pub view_latency: ViewLatency,

    /// `tracing` filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

fn default_views() -> Vec<String> {
    ["All", "Active", "Draft", "Archived"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Default for StoredeskConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            session_token: None,
            request_timeout_secs: default_timeout_secs(),
            default_views: default_views(),
            view_latency: ViewLatency::default(),
            log_filter: default_log_filter(),
        }
    }
}

impl StoredeskConfig {
    /// Keys accepted by [`Self::set`]
    pub const KEYS: [&'static str; 7] = [
        "base_url",
        "session_token",
        "request_timeout_secs",
        "default_views",
        "view_latency.create_ms",
        "view_latency.mutate_ms",
        "log_filter",
    ];

    /// Get the path to the config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::Message("Could not determine config directory".to_string()))?;

        Ok(config_dir.join("storedesk").join("config.toml"))
    }

    /// Load configuration from the default location, creating it if missing
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config file cannot be read, parsed, or created.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, creating a default file if missing
    ///
    /// Environment overrides are applied on top of the file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, parsed, or created.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            Self::default().save_to(path)?;
        }

        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml))
            .add_source(
                Environment::with_prefix("STOREDESK")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("default_views"),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Load configuration, running first-time setup if it doesn't exist
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if loading or creating the configuration fails.
    pub fn load_or_setup() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            first_time_setup(&config_path)
        }
    }

    /// Save configuration to the default location
    ///
    /// # Errors
    ///
    /// See [`Self::save_to`].
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the directory cannot be created, the
    /// configuration cannot be serialized to TOML, or the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Message(format!("Failed to create config directory: {e}")))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Message(format!("Failed to serialize config: {e}")))?;

        fs::write(path, toml_string)
            .map_err(|e| ConfigError::Message(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Set one key from its string form
    ///
    /// `default_views` takes a comma-separated list; an empty
    /// `session_token` clears it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for an unknown key or an unparsable value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match key {
            "base_url" => self.base_url = value.to_string(),
            "session_token" => {
                self.session_token = (!value.is_empty()).then(|| value.to_string());
            }
            "request_timeout_secs" => self.request_timeout_secs = parse_number(key, value)?,
            "default_views" => {
                let views: Vec<String> = value
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(String::from)
                    .collect();
                if views.is_empty() {
                    return Err(ConfigError::Message("default_views needs at least one name".to_string()));
                }
                self.default_views = views;
            }
            "view_latency.create_ms" => self.view_latency.create_ms = parse_number(key, value)?,
            "view_latency.mutate_ms" => self.view_latency.mutate_ms = parse_number(key, value)?,
            "log_filter" => self.log_filter = value.to_string(),
            _ => {
                return Err(ConfigError::Message(format!(
                    "Unknown config key '{key}' (expected one of: {})",
                    Self::KEYS.join(", ")
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .parse()
        .map_err(|e| ConfigError::Message(format!("Invalid value for {key}: {e}")))
}
