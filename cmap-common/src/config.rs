//! Service location and logging configuration
//!
//! The service base URL is resolved in priority order:
//! 1. Explicit override (highest priority)
//! 2. Environment variable `CMAP_API_URL`
//! 3. TOML config file (`api_url`)
//! 4. Compiled default `http://localhost:8000` (fallback)
//!
//! A missing or unreadable TOML file never fails resolution; it is logged
//! and the remaining tiers apply.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Fallback service location
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Fallback request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable overriding the service location
pub const API_URL_ENV: &str = "CMAP_API_URL";

/// Environment variable overriding the request timeout (seconds)
pub const TIMEOUT_ENV: &str = "CMAP_TIMEOUT_SECS";

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Base URL of the community-detection service
    pub api_url: Option<String>,
    /// Request timeout in seconds
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[logging]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default tracing filter directive (overridden by `RUST_LOG`)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Where and how to reach the external service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Base URL without trailing slash
    pub base_url: String,
    pub request_timeout: Duration,
}

impl ServiceConfig {
    /// Build a config for `base_url`, trimming whitespace and trailing slashes
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = normalize_url(base_url)
            .ok_or_else(|| Error::InvalidInput("service base URL is empty".to_string()))?;
        Ok(Self {
            base_url,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Absolute URL for an API path such as `/api/analyze`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Fully resolved client configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub service: ServiceConfig,
    pub logging: LoggingConfig,
}

/// Tiered resolver for [`ResolvedConfig`]
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    explicit_url: Option<String>,
    config_path: Option<PathBuf>,
}

impl ConfigResolver {
    /// Resolver using the platform config file location
    pub fn new() -> Self {
        Self {
            explicit_url: None,
            config_path: default_config_path(),
        }
    }

    /// Highest-priority service URL
    pub fn with_override(mut self, url: impl Into<String>) -> Self {
        self.explicit_url = Some(url.into());
        self
    }

    /// Read TOML settings from `path` instead of the platform location
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn resolve(&self) -> ResolvedConfig {
        let toml_config = self.load_toml();

        let base_url = self.resolve_url(&toml_config);
        let timeout_secs = resolve_timeout(&toml_config);

        info!(base_url = %base_url, timeout_secs, "Service configuration resolved");

        ResolvedConfig {
            service: ServiceConfig {
                base_url,
                request_timeout: Duration::from_secs(timeout_secs),
            },
            logging: toml_config.logging,
        }
    }

    fn resolve_url(&self, toml_config: &TomlConfig) -> String {
        // Priority 1: explicit override
        if let Some(url) = self.explicit_url.as_deref().and_then(normalize_url) {
            debug!("Service URL from explicit override");
            return url;
        }

        // Priority 2: environment variable
        if let Some(url) = std::env::var(API_URL_ENV).ok().as_deref().and_then(normalize_url) {
            debug!("Service URL from {}", API_URL_ENV);
            return url;
        }

        // Priority 3: TOML config file
        if let Some(url) = toml_config.api_url.as_deref().and_then(normalize_url) {
            debug!("Service URL from TOML config");
            return url;
        }

        // Priority 4: compiled default
        DEFAULT_API_URL.to_string()
    }

    fn load_toml(&self) -> TomlConfig {
        let Some(path) = &self.config_path else {
            return TomlConfig::default();
        };
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return TomlConfig::default();
        }
        match load_toml_config(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable config file");
                TomlConfig::default()
            }
        }
    }
}

fn resolve_timeout(toml_config: &TomlConfig) -> u64 {
    if let Ok(raw) = std::env::var(TIMEOUT_ENV) {
        match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => return secs,
            _ => warn!(value = %raw, "Ignoring invalid {}", TIMEOUT_ENV),
        }
    }
    match toml_config.request_timeout_secs {
        Some(secs) if secs > 0 => secs,
        _ => DEFAULT_TIMEOUT_SECS,
    }
}

fn normalize_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Platform location of `config.toml` (e.g. `~/.config/cmap/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cmap").join("config.toml"))
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str(&content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let config = ServiceConfig::new("http://svc:9000/ ").unwrap();
        assert_eq!(config.base_url, "http://svc:9000");
        assert_eq!(config.endpoint("/api/analyze"), "http://svc:9000/api/analyze");
        assert_eq!(config.endpoint("api/health"), "http://svc:9000/api/health");
    }

    #[test]
    fn test_blank_url_rejected() {
        assert!(matches!(ServiceConfig::new("  / "), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_default_points_at_localhost() {
        let config = ServiceConfig::default();
        assert_eq!(config.base_url, DEFAULT_API_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_toml_logging_defaults_when_table_missing() {
        let config: TomlConfig = toml::from_str(r#"api_url = "http://x""#).unwrap();
        assert_eq!(config.api_url.as_deref(), Some("http://x"));
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.request_timeout_secs, None);
    }
}
