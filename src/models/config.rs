//! Configuration types.
//!
//! This module contains configuration structures for the node API connection,
//! refresh behavior and display settings, plus the layered loader
//! (defaults, system file, user file, environment).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable that turns config problems into hard errors
const STRICT_ENV: &str = "NODEMAN_STRICT_CONFIG";

/// System-wide config file
const SYSTEM_CONFIG_PATH: &str = "/etc/nodeman/config.toml";

/// Minimum allowed refresh interval in seconds (prevents tight polling loops)
const MIN_REFRESH_INTERVAL: u64 = 1;

/// Minimum request timeout in seconds
const MIN_TIMEOUT: u64 = 1;

/// Errors raised while loading configuration in strict mode
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("could not read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid value '{value}' for {name}: {reason}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    InvalidValue(String),
}

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,

    pub refresh: RefreshConfig,

    pub display: DisplayConfig,
}

/// Node API connection settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the node API (the `/api/nodes` path is appended)
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:12345".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Re-fetch the node list periodically
    pub auto_refresh: bool,

    /// Periodic refresh interval in seconds
    pub interval: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            auto_refresh: false,
            interval: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Theme name
    pub theme: String,

    /// Maximum length for host names before truncation
    pub name_max_length: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            name_max_length: 30,
        }
    }
}

/// Validate that a value meets the minimum requirement.
/// In non-strict mode, corrects invalid values to the default and adds a warning.
/// In strict mode, returns an error for invalid values.
fn validate_min(
    value: &mut u64,
    field: &str,
    min: u64,
    default: u64,
    strict: bool,
    warnings: &mut Vec<String>,
) -> Result<(), ConfigError> {
    if *value < min {
        let msg = format!("{field} must be at least {min} second(s), got {value}");
        if strict {
            return Err(ConfigError::InvalidValue(msg));
        }
        warnings.push(format!("{msg} - using default ({default})"));
        *value = default;
    }
    Ok(())
}

impl Config {
    /// Validate numeric settings.
    /// Returns a list of warnings for invalid values that were corrected to defaults.
    /// If `strict` is true, returns Err instead of correcting values.
    pub fn validate(&mut self, strict: bool) -> Result<Vec<String>, ConfigError> {
        let mut warnings = Vec::new();

        validate_min(
            &mut self.api.timeout_secs,
            "api.timeout_secs",
            MIN_TIMEOUT,
            ApiConfig::default().timeout_secs,
            strict,
            &mut warnings,
        )?;

        // interval only matters when auto refresh is on
        if self.refresh.auto_refresh {
            validate_min(
                &mut self.refresh.interval,
                "refresh.interval",
                MIN_REFRESH_INTERVAL,
                RefreshConfig::default().interval,
                strict,
                &mut warnings,
            )?;
        }

        let base = self.api.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            let msg = format!("api.base_url must start with http:// or https://, got '{base}'");
            if strict {
                return Err(ConfigError::InvalidValue(msg));
            }
            let default = ApiConfig::default().base_url;
            warnings.push(format!("{msg} - using default ({default})"));
            self.api.base_url = default;
        }

        Ok(warnings)
    }

    /// Get the user config file path, respecting XDG_CONFIG_HOME
    ///
    /// Resolution order:
    /// 1. $XDG_CONFIG_HOME/nodeman/config.toml (if XDG_CONFIG_HOME is set)
    /// 2. $HOME/.config/nodeman/config.toml (if HOME is set)
    /// 3. dirs::config_dir()/nodeman/config.toml
    #[must_use]
    pub fn user_config_path() -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
            && !xdg_config.is_empty()
        {
            return Some(PathBuf::from(xdg_config).join("nodeman/config.toml"));
        }

        if let Some(home) = std::env::var_os("HOME") {
            return Some(PathBuf::from(home).join(".config/nodeman/config.toml"));
        }

        dirs::config_dir().map(|dir| dir.join("nodeman/config.toml"))
    }

    /// Load configuration from files and environment.
    /// Returns the config and any warnings encountered during loading.
    pub fn load() -> Result<(Self, Vec<String>), ConfigError> {
        let strict = Self::is_strict_mode();
        let mut config = Self::default();
        let mut warnings = Vec::new();

        Self::load_config_file(&mut config, Path::new(SYSTEM_CONFIG_PATH), strict, &mut warnings)?;

        if let Some(user_path) = Self::user_config_path() {
            Self::load_config_file(&mut config, &user_path, strict, &mut warnings)?;
        }

        config.apply_env_overrides(strict, &mut warnings)?;
        warnings.extend(config.validate(strict)?);

        tracing::debug!(?config, warnings = warnings.len(), "configuration loaded");
        Ok((config, warnings))
    }

    /// Override the API base URL (from the command line)
    pub fn with_api_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url {
            self.api.base_url = url;
        }
        self
    }

    fn is_strict_mode() -> bool {
        std::env::var(STRICT_ENV)
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    /// Load a config file, collecting warnings on parse errors but not on missing files.
    fn load_config_file(
        config: &mut Self,
        path: &Path,
        strict: bool,
        warnings: &mut Vec<String>,
    ) -> Result<(), ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => match Self::parse(&content) {
                Ok(parsed) => *config = parsed,
                Err(source) => {
                    let path = path.display().to_string();
                    if strict {
                        return Err(ConfigError::Parse { path, source });
                    }
                    warnings.push(format!("Config parse error in '{}': {}", path, source));
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                let path = path.display().to_string();
                if strict {
                    return Err(ConfigError::Read { path, source });
                }
                warnings.push(format!("Could not read config '{}': {}", path, source));
            }
        }
        Ok(())
    }

    /// Parse a TOML document into a config (missing keys take defaults)
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn apply_env_overrides(
        &mut self,
        strict: bool,
        warnings: &mut Vec<String>,
    ) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("NODEMAN_API_URL")
            && !val.is_empty()
        {
            self.api.base_url = val;
        }

        if let Ok(val) = std::env::var("NODEMAN_THEME") {
            self.display.theme = val;
        }

        if let Ok(val) = std::env::var("NODEMAN_REFRESH") {
            match val.parse::<u64>() {
                Ok(0) => self.refresh.auto_refresh = false,
                Ok(secs) => {
                    self.refresh.auto_refresh = true;
                    self.refresh.interval = secs;
                }
                Err(_) => {
                    let err = ConfigError::InvalidEnv {
                        name: "NODEMAN_REFRESH",
                        value: val,
                        reason: "expected a non-negative integer (seconds, 0 disables)".to_string(),
                    };
                    if strict {
                        return Err(err);
                    }
                    warnings.push(format!("{err} - ignored"));
                }
            }
        }

        Ok(())
    }
}
