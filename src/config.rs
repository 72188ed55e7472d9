//! Configuration module for Liftgate
//!
//! Configuration hierarchy:
//! 1. Environment variables (`SPACELIFT_*` credentials, `LIFTGATE_*` tuning)
//! 2. User config (~/.config/liftgate/config.toml)
//! 3. Built-in defaults
//!
//! Credentials are resolved lazily: only commands that talk to the platform
//! require them, and a missing one fails with the exact variable to set.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LiftgateError, LiftgateResult};

/// Default run-monitor timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Default run-monitor poll interval in seconds
const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub credentials: CredentialsConfig,

    #[serde(default)]
    pub promotion: PromotionConfig,

    #[serde(default)]
    pub monitor: MonitorConfig,
}

/// Platform credentials as they appear in the config file.
///
/// All fields optional here; `Config::credentials` resolves them against the
/// environment and fails precisely when one is still missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub api_key_id: Option<String>,

    #[serde(default)]
    pub api_key_secret: Option<String>,
}

/// Environment labels used by the promotion matcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionConfig {
    #[serde(default = "default_staging_label")]
    pub staging_label: String,

    #[serde(default = "default_production_label")]
    pub production_label: String,
}

impl Default for PromotionConfig {
    fn default() -> Self {
        Self {
            staging_label: default_staging_label(),
            production_label: default_production_label(),
        }
    }
}

fn default_staging_label() -> String {
    "staging".to_string()
}

fn default_production_label() -> String {
    "production".to_string()
}

/// Run monitor tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

impl MonitorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// Fully resolved platform credentials
#[derive(Debug, Clone)]
pub struct Credentials {
    pub endpoint: String,
    pub api_key_id: String,
    pub api_key_secret: String,
}

impl Config {
    /// Load configuration from a specific TOML file
    pub fn load(path: &Path) -> LiftgateResult<Self> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| LiftgateError::InvalidConfig {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load the user config if present, then apply environment overrides.
    ///
    /// A missing config file is not an error; a malformed one is.
    pub fn load_or_default() -> LiftgateResult<Self> {
        let mut config = match Self::user_config_path() {
            Some(path) if path.exists() => Self::load(&path)?,
            _ => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Standard user config location (~/.config/liftgate/config.toml)
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("liftgate").join("config.toml"))
    }

    /// Apply overrides from a variable lookup (the environment in production,
    /// a map in tests).
    pub fn apply_overrides(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(v) = get("SPACELIFT_API_ENDPOINT") {
            self.credentials.endpoint = Some(v);
        }
        if let Some(v) = get("SPACELIFT_API_KEY_ID") {
            self.credentials.api_key_id = Some(v);
        }
        if let Some(v) = get("SPACELIFT_API_KEY_SECRET") {
            self.credentials.api_key_secret = Some(v);
        }
        if let Some(v) = get("LIFTGATE_STAGING_LABEL") {
            self.promotion.staging_label = v;
        }
        if let Some(v) = get("LIFTGATE_PRODUCTION_LABEL") {
            self.promotion.production_label = v;
        }
        if let Some(v) = get("LIFTGATE_TIMEOUT_SECS") {
            if let Ok(secs) = v.parse() {
                self.monitor.timeout_secs = secs;
            }
        }
        if let Some(v) = get("LIFTGATE_POLL_INTERVAL_SECS") {
            if let Ok(secs) = v.parse() {
                self.monitor.poll_interval_secs = secs;
            }
        }
    }

    /// Resolve credentials, failing with the variable name that is missing
    pub fn credentials(&self) -> LiftgateResult<Credentials> {
        let endpoint = self
            .credentials
            .endpoint
            .clone()
            .ok_or_else(|| missing("SPACELIFT_API_ENDPOINT"))?;
        let api_key_id = self
            .credentials
            .api_key_id
            .clone()
            .ok_or_else(|| missing("SPACELIFT_API_KEY_ID"))?;
        let api_key_secret = self
            .credentials
            .api_key_secret
            .clone()
            .ok_or_else(|| missing("SPACELIFT_API_KEY_SECRET"))?;

        Ok(Credentials {
            endpoint,
            api_key_id,
            api_key_secret,
        })
    }
}

fn missing(variable: &str) -> LiftgateError {
    LiftgateError::MissingCredential {
        variable: variable.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn lookup<'a>(map: &'a HashMap<&'a str, &'a str>) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| map.get(name).map(|v| v.to_string())
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::default();

        assert_eq!(config.promotion.staging_label, "staging");
        assert_eq!(config.promotion.production_label, "production");
        assert_eq!(config.monitor.timeout(), Duration::from_secs(600));
        assert_eq!(config.monitor.poll_interval(), Duration::from_secs(10));
        assert!(config.credentials.endpoint.is_none());
    }

    #[test]
    fn test_config_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[credentials]
endpoint = "https://example.app.spacelift.io"
api_key_id = "key-id"
api_key_secret = "key-secret"

[promotion]
staging_label = "stage"

[monitor]
timeout_secs = 120
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();

        assert_eq!(
            config.credentials.endpoint.as_deref(),
            Some("https://example.app.spacelift.io")
        );
        assert_eq!(config.promotion.staging_label, "stage");
        // Unset sections and fields keep their defaults
        assert_eq!(config.promotion.production_label, "production");
        assert_eq!(config.monitor.timeout_secs, 120);
        assert_eq!(config.monitor.poll_interval_secs, 10);
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "credentials = not valid").unwrap();

        let result = Config::load(&path);
        assert!(matches!(
            result,
            Err(LiftgateError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_env_overrides_beat_file_values() {
        let mut config = Config::default();
        config.credentials.endpoint = Some("https://from-file".to_string());

        let mut vars = HashMap::new();
        vars.insert("SPACELIFT_API_ENDPOINT", "https://from-env");
        vars.insert("LIFTGATE_PRODUCTION_LABEL", "prod");
        vars.insert("LIFTGATE_TIMEOUT_SECS", "90");
        config.apply_overrides(lookup(&vars));

        assert_eq!(
            config.credentials.endpoint.as_deref(),
            Some("https://from-env")
        );
        assert_eq!(config.promotion.production_label, "prod");
        assert_eq!(config.monitor.timeout_secs, 90);
    }

    #[test]
    fn test_env_override_ignores_unparseable_numbers() {
        let mut config = Config::default();

        let mut vars = HashMap::new();
        vars.insert("LIFTGATE_TIMEOUT_SECS", "soon");
        config.apply_overrides(lookup(&vars));

        assert_eq!(config.monitor.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_credentials_missing_names_variable() {
        let mut config = Config::default();
        config.credentials.endpoint = Some("https://example".to_string());
        config.credentials.api_key_id = Some("id".to_string());

        let err = config.credentials().unwrap_err();
        assert!(err.to_string().contains("SPACELIFT_API_KEY_SECRET"));
    }

    #[test]
    fn test_credentials_resolved() {
        let mut config = Config::default();
        config.credentials.endpoint = Some("https://example".to_string());
        config.credentials.api_key_id = Some("id".to_string());
        config.credentials.api_key_secret = Some("secret".to_string());

        let creds = config.credentials().unwrap();
        assert_eq!(creds.endpoint, "https://example");
        assert_eq!(creds.api_key_id, "id");
        assert_eq!(creds.api_key_secret, "secret");
    }
}
