//! Configuration management for doorman.
//!
//! Loads configuration from ${DOORMAN_HOME}/config.toml with sensible defaults.
//! `DOORMAN_API_ENDPOINT` overrides the endpoint from the file.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable that overrides `api_endpoint`.
pub const ENDPOINT_ENV: &str = "DOORMAN_API_ENDPOINT";

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for doorman configuration and data files.
    //!
    //! DOORMAN_HOME resolution order:
    //! 1. DOORMAN_HOME environment variable (if set)
    //! 2. ~/.config/doorman (default)

    use std::path::PathBuf;

    /// Returns the doorman home directory.
    pub fn doorman_home() -> PathBuf {
        if let Ok(home) = std::env::var("DOORMAN_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".doorman"),
            |h| h.join(".config").join("doorman"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        doorman_home().join("config.toml")
    }

    /// Returns the path to the durable session storage file.
    pub fn storage_path() -> PathBuf {
        doorman_home().join("storage.json")
    }

    /// Returns the directory diagnostic logs are written to.
    pub fn logs_dir() -> PathBuf {
        doorman_home().join("logs")
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the authentication service.
    pub api_endpoint: String,
    /// Upper bound for a single login request, in seconds.
    pub request_timeout_secs: u64,
    /// Route shown after a successful login.
    pub landing_route: String,
    /// Route of the account registration page.
    pub register_route: String,
}

impl Config {
    pub const DEFAULT_API_ENDPOINT: &'static str = "http://localhost:8080";
    pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
    pub const DEFAULT_LANDING_ROUTE: &'static str = "/Dashboard";
    pub const DEFAULT_REGISTER_ROUTE: &'static str = "/Register";

    /// Loads configuration from the default location, then applies
    /// environment overrides.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let config = Self::load_from(&paths::config_path())?;
        Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Applies overrides looked up through `lookup` (normally the process
    /// environment). Blank values are ignored.
    #[must_use]
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(endpoint) = lookup(ENDPOINT_ENV) {
            let endpoint = endpoint.trim();
            if !endpoint.is_empty() {
                self.api_endpoint = endpoint.to_string();
            }
        }
        self
    }

    /// Replaces the endpoint when an explicit override is given.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: Option<&str>) -> Self {
        if let Some(endpoint) = endpoint.map(str::trim).filter(|e| !e.is_empty()) {
            self.api_endpoint = endpoint.to_string();
        }
        self
    }

    /// Parses `api_endpoint`, rejecting anything that is not an http(s) URL.
    ///
    /// # Errors
    /// Returns an error if the endpoint is not a valid http or https URL.
    pub fn endpoint_url(&self) -> Result<url::Url> {
        let url = url::Url::parse(self.api_endpoint.trim())
            .with_context(|| format!("Invalid api_endpoint '{}'", self.api_endpoint))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => anyhow::bail!(
                "Invalid api_endpoint '{}': unsupported scheme '{other}'",
                self.api_endpoint
            ),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Serializes the effective configuration (overrides included).
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Creates a new config file with the default template.
    ///
    /// # Errors
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_endpoint: Self::DEFAULT_API_ENDPOINT.to_string(),
            request_timeout_secs: Self::DEFAULT_REQUEST_TIMEOUT_SECS,
            landing_route: Self::DEFAULT_LANDING_ROUTE.to_string(),
            register_route: Self::DEFAULT_REGISTER_ROUTE.to_string(),
        }
    }
}
