//! services/api/src/config.rs
//!
//! Defines the service's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use climatech_core::ResponseTiming;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    /// When set, snapshots go to Postgres; otherwise to `session_store_dir`.
    pub database_url: Option<String>,
    pub session_store_dir: PathBuf,
    pub allowed_origin: String,
    pub response_delay: Duration,
    pub location_prompt_delay: Duration,
    pub weather_latency: Duration,
    pub resolver_seed: Option<u64>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server Settings ---
        let bind_address_str = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let allowed_origin =
            lookup("ALLOWED_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());

        // --- Storage Settings ---
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let session_store_dir = lookup("SESSION_STORE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./data"));

        // --- Simulation Settings ---
        let response_delay = millis(&lookup, "RESPONSE_DELAY_MS", 1500)?;
        let location_prompt_delay = millis(&lookup, "LOCATION_PROMPT_DELAY_MS", 1000)?;
        let weather_latency = millis(&lookup, "WEATHER_LATENCY_MS", 1000)?;
        let resolver_seed = match lookup("RESOLVER_SEED") {
            Some(raw) => Some(raw.parse::<u64>().map_err(|e| {
                ConfigError::InvalidValue("RESOLVER_SEED".to_string(), e.to_string())
            })?),
            None => None,
        };

        Ok(Self {
            bind_address,
            log_level,
            database_url,
            session_store_dir,
            allowed_origin,
            response_delay,
            location_prompt_delay,
            weather_latency,
            resolver_seed,
        })
    }

    pub fn response_timing(&self) -> ResponseTiming {
        ResponseTiming {
            reply_delay: self.response_delay,
            prompt_delay: self.location_prompt_delay,
        }
    }
}

fn millis<F>(lookup: &F, key: &str, default: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
        None => Ok(Duration::from_millis(default)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_match_the_simulated_assistant() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_address.port(), 3000);
        assert_eq!(config.log_level, Level::INFO);
        assert!(config.database_url.is_none());
        assert_eq!(config.session_store_dir, PathBuf::from("./data"));
        assert_eq!(config.response_timing(), ResponseTiming::default());
        assert_eq!(config.weather_latency, Duration::from_millis(1000));
        assert!(config.resolver_seed.is_none());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = config_from(&[
            ("BIND_ADDRESS", "127.0.0.1:8080"),
            ("RUST_LOG", "debug"),
            ("DATABASE_URL", "postgres://localhost/climatech"),
            ("RESPONSE_DELAY_MS", "10"),
            ("RESOLVER_SEED", "42"),
        ])
        .unwrap();
        assert_eq!(config.bind_address.port(), 8080);
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/climatech"));
        assert_eq!(config.response_delay, Duration::from_millis(10));
        assert_eq!(config.resolver_seed, Some(42));
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = config_from(&[("WEATHER_LATENCY_MS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref key, _) if key == "WEATHER_LATENCY_MS"));
        let err = config_from(&[("RUST_LOG", "chatty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref key, _) if key == "RUST_LOG"));
    }
}
