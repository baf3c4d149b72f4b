//! Application configuration with layered loading.
//!
//! Sources, highest precedence first:
//!
//! 1. Environment variables (FPLWATCH_*)
//! 2. TOML config file (if FPLWATCH_CONFIG_FILE is set)
//! 3. Built-in defaults
//!
//! Command-line flags are applied on top by the binary.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::data::DEFAULT_API_BASE_URL;
use crate::refresh::RefreshPolicy;
use crate::store::default_cache_dir;
use crate::views::ViewOptions;

mod validation;

pub use validation::ConfigError;

/// Environment variable naming an optional TOML config file
pub const CONFIG_FILE_ENV: &str = "FPLWATCH_CONFIG_FILE";

const ENV_PREFIX: &str = "FPLWATCH_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Upstream API root, without trailing slash.
    ///
    /// Set via FPLWATCH_API_BASE_URL.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Directory of the dashboard cache and log file. Defaults to the
    /// platform cache dir (`~/.cache/fplwatch` on Linux).
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Directory of the daily price snapshots kept by `serve`. Defaults to
    /// `snapshots/` under the cache dir.
    #[serde(default)]
    pub snapshot_dir: Option<PathBuf>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds; no timeout when unset.
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// How long a cached payload is served without refetching.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// How long to stay off the network after a 429.
    #[serde(default = "default_rate_limit_backoff_secs")]
    pub rate_limit_backoff_secs: u64,

    /// Bind address of `fplwatch serve`.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default = "default_ticker_horizon")]
    pub ticker_horizon: usize,

    #[serde(default = "default_leaderboard_size")]
    pub leaderboard_size: usize,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.into()
}

fn default_user_agent() -> String {
    concat!("fplwatch/", env!("CARGO_PKG_VERSION")).into()
}

fn default_cache_ttl_secs() -> u64 {
    600
}

fn default_rate_limit_backoff_secs() -> u64 {
    1_800
}

fn default_listen_addr() -> String {
    "127.0.0.1:8888".into()
}

fn default_ticker_horizon() -> usize {
    5
}

fn default_leaderboard_size() -> usize {
    10
}

fn window(secs: u64) -> chrono::Duration {
    i64::try_from(secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .unwrap_or(chrono::Duration::MAX)
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            cache_dir: None,
            snapshot_dir: None,
            user_agent: default_user_agent(),
            timeout_ms: None,
            cache_ttl_secs: default_cache_ttl_secs(),
            rate_limit_backoff_secs: default_rate_limit_backoff_secs(),
            listen_addr: default_listen_addr(),
            ticker_horizon: default_ticker_horizon(),
            leaderboard_size: default_leaderboard_size(),
        }
    }
}

impl AppConfig {
    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config file or environment cannot be
    /// parsed, or if validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var(CONFIG_FILE_ENV) {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed(ENV_PREFIX)
                .ignore(&["config_file"])
                .map(|key| key.as_str().to_lowercase().into()),
        );

        Self::from_figment(figment)
    }

    /// Extracts and validates a config from an already layered figment
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment
            .extract()
            .map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Request timeout for reqwest, if configured
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Refresh windows; out-of-range values saturate instead of panicking
    pub fn policy(&self) -> RefreshPolicy {
        RefreshPolicy {
            cache_duration: window(self.cache_ttl_secs),
            rate_limit_backoff: window(self.rate_limit_backoff_secs),
        }
    }

    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            ticker_horizon: self.ticker_horizon,
            leaderboard_size: self.leaderboard_size,
        }
    }

    /// Cache directory, falling back to the platform default
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` when no cache dir is configured and
    /// the platform has no home directory.
    pub fn resolved_cache_dir(&self) -> Result<PathBuf, ConfigError> {
        self.cache_dir
            .clone()
            .or_else(default_cache_dir)
            .ok_or_else(|| ConfigError::Missing {
                field: "cache_dir".into(),
                hint: "Set FPLWATCH_CACHE_DIR or pass --cache-dir".into(),
            })
    }

    /// Snapshot directory, `snapshots/` under the cache dir by default
    pub fn resolved_snapshot_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.snapshot_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(self.resolved_cache_dir()?.join("snapshots")),
        }
    }

    /// Parsed bind address of the proxy
    pub fn listen_socket(&self) -> Result<SocketAddr, ConfigError> {
        self.listen_addr
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                field: "listen_addr".into(),
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.api_base_url, "https://fantasy.premierleague.com/api");
        assert!(config.user_agent.starts_with("fplwatch/"));
        assert!(config.timeout_ms.is_none());
        assert_eq!(config.cache_ttl_secs, 600);
        assert_eq!(config.rate_limit_backoff_secs, 1_800);
        assert_eq!(config.listen_addr, "127.0.0.1:8888");
        assert_eq!(config.view_options(), ViewOptions::default());
    }

    #[test]
    fn test_default_policy_matches_refresh_defaults() {
        assert_eq!(AppConfig::default().policy(), RefreshPolicy::default());
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig {
            timeout_ms: Some(2_500),
            ..Default::default()
        };
        assert_eq!(config.timeout(), Some(Duration::from_millis(2_500)));
        assert_eq!(AppConfig::default().timeout(), None);
    }

    #[test]
    fn test_toml_layer_overrides_defaults() {
        let figment = Figment::from(Serialized::defaults(AppConfig::default())).merge(
            Toml::string(
                r#"
                cache_ttl_secs = 60
                leaderboard_size = 3
                cache_dir = "/tmp/fplwatch-test"
                "#,
            ),
        );

        let config = AppConfig::from_figment(figment).expect("valid config");

        assert_eq!(config.cache_ttl_secs, 60);
        assert_eq!(config.leaderboard_size, 3);
        assert_eq!(config.ticker_horizon, 5);
        assert_eq!(
            config.resolved_snapshot_dir().expect("snapshot dir"),
            PathBuf::from("/tmp/fplwatch-test/snapshots")
        );
    }

    #[test]
    fn test_invalid_layer_is_rejected() {
        let figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::string("ticker_horizon = 0"));

        let result = AppConfig::from_figment(figment);

        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "ticker_horizon"));
    }

    #[test]
    fn test_huge_ttl_is_rejected_at_load() {
        let figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::string("cache_ttl_secs = 10000000000000000"));

        let result = AppConfig::from_figment(figment);

        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "cache_ttl_secs"));
    }

    #[test]
    fn test_policy_saturates_out_of_range_windows() {
        let config = AppConfig {
            cache_ttl_secs: u64::MAX,
            rate_limit_backoff_secs: 10_000_000_000_000_000,
            ..Default::default()
        };

        let policy = config.policy();

        assert_eq!(policy.cache_duration, chrono::Duration::MAX);
        assert_eq!(policy.rate_limit_backoff, chrono::Duration::MAX);
    }

    #[test]
    fn test_listen_socket() {
        let config = AppConfig::default();
        assert_eq!(
            config.listen_socket().expect("addr").to_string(),
            "127.0.0.1:8888"
        );
    }
}
