//! Configuration validation rules.

use thiserror::Error;

use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

/// Longest cache TTL or rate-limit backoff accepted, one week
pub const MAX_WINDOW_SECS: u64 = 7 * 24 * 60 * 60;

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field: field.into(),
        reason: reason.into(),
    }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `api_base_url` is not an http(s) URL
    /// - `user_agent` is empty
    /// - `timeout_ms` is set below 100ms
    /// - `cache_ttl_secs`, `ticker_horizon` or `leaderboard_size` is 0
    /// - `cache_ttl_secs` or `rate_limit_backoff_secs` exceeds one week
    /// - `listen_addr` is not a socket address
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://")) {
            return Err(invalid("api_base_url", "must start with http:// or https://"));
        }

        if self.user_agent.trim().is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if let Some(ms) = self.timeout_ms {
            if ms < 100 {
                return Err(invalid("timeout_ms", "must be at least 100ms"));
            }
        }

        if self.cache_ttl_secs == 0 {
            return Err(invalid("cache_ttl_secs", "must be greater than 0"));
        }

        if self.cache_ttl_secs > MAX_WINDOW_SECS {
            return Err(invalid("cache_ttl_secs", "must be at most one week (604800)"));
        }

        if self.rate_limit_backoff_secs > MAX_WINDOW_SECS {
            return Err(invalid(
                "rate_limit_backoff_secs",
                "must be at most one week (604800)",
            ));
        }

        if self.ticker_horizon == 0 {
            return Err(invalid("ticker_horizon", "must be greater than 0"));
        }

        if self.leaderboard_size == 0 {
            return Err(invalid("leaderboard_size", "must be greater than 0"));
        }

        self.listen_socket()?;

        if self.rate_limit_backoff_secs == 0 {
            tracing::warn!("rate_limit_backoff_secs is 0; a 429 will not pause fetching");
        }

        Ok(())
    }
}
