use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::error::FALLBACK_MESSAGE;

/// Texts the widget writes into its controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    /// Button label while idle.
    pub idle: String,
    /// Button label while a request is pending.
    pub loading: String,
    /// Banner text when the backend gives no reason.
    pub fallback_error: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            idle: "Get Weather".to_string(),
            loading: "Loading...".to_string(),
            fallback_error: FALLBACK_MESSAGE.to_string(),
        }
    }
}

/// Login for backends that gate `/weather` behind a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// base_url = "http://127.0.0.1:5001"
/// timeout_secs = 10
///
/// [labels]
/// idle = "Get Weather"
///
/// [credentials]
/// username = "ana"
/// password = "..."
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where `/weather` is served from.
    pub base_url: String,

    /// Client-side request timeout. `None` leaves it to the transport.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    pub labels: Labels,

    /// Used to log in before the first request, when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,
}

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5001";

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
            labels: Labels::default(),
            credentials: None,
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, use defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "cityweather", "cityweather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Replace the base URL after checking it looks like an HTTP origin.
    pub fn set_base_url(&mut self, url: &str) -> Result<()> {
        let url = url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(anyhow!(
                "Invalid backend URL '{url}'. It must start with http:// or https://."
            ));
        }
        self.base_url = url.trim_end_matches('/').to_string();
        Ok(())
    }

    /// Store a login, or clear it when `username` is blank.
    pub fn set_credentials(&mut self, username: &str, password: String) {
        let username = username.trim();
        self.credentials = if username.is_empty() {
            None
        } else {
            Some(Credentials {
                username: username.to_string(),
                password,
            })
        };
    }
}
