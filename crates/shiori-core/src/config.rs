use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ShioriError;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Environment variable overriding `gateway.upstream_base_url`.
pub const UPSTREAM_ENV: &str = "API_BASE_URL";
/// Environment variable overriding `client.gateway_url`.
pub const GATEWAY_URL_ENV: &str = "SHIORI_GATEWAY_URL";

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Proxy gateway settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Socket address to listen on.
    pub bind: String,
    /// Path prefix the gateway is mounted under, without slashes.
    pub prefix: String,
    pub upstream_base_url: String,
    pub timeout_secs: u64,
}

/// Settings for the catalog client that talks to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub gateway_url: String,
    pub timeout_secs: u64,
}

/// Staleness windows per operation group, in seconds. Keys missing from a
/// user file keep their default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub anime_secs: u64,
    pub list_secs: u64,
    pub search_secs: u64,
    pub genre_list_secs: u64,
    pub genre_secs: u64,
    pub enumeration_secs: u64,
}

impl GatewayConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Prefix with surrounding slashes trimmed, e.g. `api`.
    pub fn prefix(&self) -> &str {
        self.prefix.trim_matches('/')
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AppConfig {
    /// Load config: the user file if it exists, otherwise built-in defaults,
    /// then environment overrides.
    pub fn load() -> Result<Self, ShioriError> {
        let user_path = Self::config_path();
        let mut config = if user_path.exists() {
            Self::from_path(&user_path)?
        } else {
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a config file. Missing sections fall back to the defaults.
    pub fn from_path(path: &Path) -> Result<Self, ShioriError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ShioriError::Config(format!("{}: {e}", path.display())))?;
        toml::from_str(&content).map_err(|e| ShioriError::Config(e.to_string()))
    }

    /// Apply environment-style overrides. Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let set = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(upstream) = set(UPSTREAM_ENV) {
            tracing::debug!(%upstream, "upstream base URL from environment");
            self.gateway.upstream_base_url = upstream;
        }
        if let Some(gateway_url) = set(GATEWAY_URL_ENV) {
            self.client.gateway_url = gateway_url;
        }
    }

    /// Reject URLs that cannot be used as request bases.
    pub fn validate(&self) -> Result<(), ShioriError> {
        for (name, value) in [
            ("gateway.upstream_base_url", &self.gateway.upstream_base_url),
            ("client.gateway_url", &self.client.gateway_url),
        ] {
            let url = Url::parse(value)
                .map_err(|e| ShioriError::Config(format!("{name}: {e}")))?;
            if url.cannot_be_a_base() {
                return Err(ShioriError::Config(format!("{name}: {value} is not a base URL")));
            }
        }
        if self.gateway.prefix().is_empty() {
            return Err(ShioriError::Config("gateway.prefix must not be empty".into()));
        }
        Ok(())
    }

    /// Save current config to the user config file.
    pub fn save(&self) -> Result<(), ShioriError> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ShioriError::Config(e.to_string()))?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("", "", "shiori")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}

// Must not parse DEFAULT_CONFIG: serde calls these while reading each
// section. `test_section_defaults_match_default_file` keeps them in sync.
impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".into(),
            prefix: "api".into(),
            upstream_base_url: "http://45.153.71.157:8000".into(),
            timeout_secs: 30,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            gateway_url: "http://127.0.0.1:3000/api".into(),
            timeout_secs: 30,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            anime_secs: 10 * 60,
            list_secs: 5 * 60,
            search_secs: 5 * 60,
            genre_list_secs: 12 * 60 * 60,
            genre_secs: 12 * 60 * 60,
            enumeration_secs: 60 * 60,
        }
    }
}
