//! Environment-driven configuration

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the catalog service; endpoints live under `/api/products`
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub user_agent: String,
    pub cache_sweep_interval: Duration,
    /// Cron expression for the periodic catalog refresh
    pub refresh_cron: String,
    pub cart_db_url: String,
    pub log_level: String,
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when a numeric variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        build_config(|key| std::env::var(key).ok())
    }
}

/// Builds a [`Config`] from an arbitrary variable lookup
pub fn build_config<F>(lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let or_default = |var: &str, default: &str| lookup(var).unwrap_or_else(|| default.to_string());

    let parse_secs = |var: &str, default: &str| -> Result<Duration, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    Ok(Config {
        api_base_url: or_default("CATALOG_API_URL", "http://localhost:8000"),
        request_timeout: parse_secs("CATALOG_REQUEST_TIMEOUT_SECS", "30")?,
        user_agent: or_default("CATALOG_USER_AGENT", "product-catalog/0.1"),
        cache_sweep_interval: parse_secs("CATALOG_CACHE_SWEEP_SECS", "60")?,
        refresh_cron: or_default("CATALOG_REFRESH_CRON", "0 */5 * * * *"),
        cart_db_url: or_default("CATALOG_CART_DB", "sqlite:cart.db"),
        log_level: or_default("CATALOG_LOG_LEVEL", "info"),
    })
}
