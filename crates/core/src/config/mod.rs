//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SAHIFA_*)
//! 2. TOML config file (if SAHIFA_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::cache::ExpirationRule;

mod validation;

pub use validation::ConfigError;

/// Which strategy the API route uses.
///
/// The original deployment configured both at different times; Network-First
/// is the canonical default, with SWR kept selectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApiStrategy {
    NetworkFirst,
    StaleWhileRevalidate,
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SAHIFA_*)
/// 2. TOML config file (if SAHIFA_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite cache database.
    ///
    /// Set via SAHIFA_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Application origin that precache URLs resolve against.
    ///
    /// Set via SAHIFA_BASE_URL environment variable.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User-Agent string for HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Total HTTP request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Network-First fallback deadline in seconds.
    #[serde(default = "default_network_timeout_secs")]
    pub network_timeout_secs: u64,

    /// Path prefix routed to the API cache.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Strategy applied to the API route.
    #[serde(default = "default_api_strategy")]
    pub api_strategy: ApiStrategy,

    /// Entry bound for the API store.
    #[serde(default = "default_api_max_entries")]
    pub api_max_entries: usize,

    /// Age bound for the API store, in seconds (24 hours).
    #[serde(default = "default_api_max_age_secs")]
    pub api_max_age_secs: u64,

    /// Entry bound for the static asset store.
    #[serde(default = "default_static_max_entries")]
    pub static_max_entries: usize,

    /// Age bound for the static asset store, in seconds (30 days).
    #[serde(default = "default_static_max_age_secs")]
    pub static_max_age_secs: u64,

    /// Precached document served for unmatched navigations.
    #[serde(default = "default_entry_point")]
    pub entry_point: String,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./sahifa-cache.sqlite")
}

fn default_base_url() -> String {
    "http://localhost:8000".into()
}

fn default_user_agent() -> String {
    "sahifa/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_network_timeout_secs() -> u64 {
    10
}

fn default_api_prefix() -> String {
    "/api/".into()
}

fn default_api_strategy() -> ApiStrategy {
    ApiStrategy::NetworkFirst
}

fn default_api_max_entries() -> usize {
    50
}

fn default_api_max_age_secs() -> u64 {
    24 * 60 * 60
}

fn default_static_max_entries() -> usize {
    60
}

fn default_static_max_age_secs() -> u64 {
    30 * 24 * 60 * 60
}

fn default_entry_point() -> String {
    "/index.html".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            network_timeout_secs: default_network_timeout_secs(),
            api_prefix: default_api_prefix(),
            api_strategy: default_api_strategy(),
            api_max_entries: default_api_max_entries(),
            api_max_age_secs: default_api_max_age_secs(),
            static_max_entries: default_static_max_entries(),
            static_max_age_secs: default_static_max_age_secs(),
            entry_point: default_entry_point(),
        }
    }
}

impl AppConfig {
    /// Total fetch timeout as a Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Network-First deadline as a Duration.
    pub fn network_timeout(&self) -> Duration {
        Duration::from_secs(self.network_timeout_secs)
    }

    /// Expiration rule bound to the API store.
    pub fn api_expiration(&self) -> ExpirationRule {
        ExpirationRule { max_entries: self.api_max_entries, max_age: Duration::from_secs(self.api_max_age_secs) }
    }

    /// Expiration rule bound to the static asset store.
    pub fn static_expiration(&self) -> ExpirationRule {
        ExpirationRule {
            max_entries: self.static_max_entries,
            max_age: Duration::from_secs(self.static_max_age_secs),
        }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SAHIFA_`
    /// 2. TOML file from `SAHIFA_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SAHIFA_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SAHIFA_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.db_path, PathBuf::from("./sahifa-cache.sqlite"));
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.user_agent, "sahifa/0.1");
        assert_eq!(config.max_bytes, 5_242_880);
        assert_eq!(config.timeout_ms, 20_000);
        assert_eq!(config.network_timeout_secs, 10);
        assert_eq!(config.api_prefix, "/api/");
        assert_eq!(config.api_strategy, ApiStrategy::NetworkFirst);
        assert_eq!(config.entry_point, "/index.html");
    }

    #[test]
    fn test_default_expiration_rules() {
        let config = AppConfig::default();
        let api = config.api_expiration();
        assert_eq!(api.max_entries, 50);
        assert_eq!(api.max_age, Duration::from_secs(24 * 60 * 60));

        let stat = config.static_expiration();
        assert_eq!(stat.max_entries, 60);
        assert_eq!(stat.max_age, Duration::from_secs(30 * 24 * 60 * 60));
    }

    #[test]
    fn test_timeout_durations() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
        assert_eq!(config.network_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_api_strategy_serde() {
        let strategy: ApiStrategy = serde_json::from_str("\"stale-while-revalidate\"").unwrap();
        assert_eq!(strategy, ApiStrategy::StaleWhileRevalidate);
        assert_eq!(serde_json::to_string(&ApiStrategy::NetworkFirst).unwrap(), "\"network-first\"");
    }
}
