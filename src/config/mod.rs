//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `VERIDIAN_*` environment variables.
//! Provider credentials are not read here; genai picks them up from its own
//! environment variables for the adapter the model name resolves to.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::batch::{BatchConfig, DEFAULT_CHUNK_SIZE, DEFAULT_CITY_CONCURRENCY, TierSet};
use crate::engine::EngineSettings;
use crate::research::{DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY, RetryPolicy, current_year};
use crate::supervisor::MAX_RETAINED_RUNS;

/// Service configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `VERIDIAN_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8000`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// sqlx connection URL for the evaluation store. Default: `sqlite://veridian.db`.
    pub database_url: String,

    /// Model identifier handed to genai. Default: `gpt-4o-mini`.
    pub model: String,

    pub temperature: f64,

    pub max_tokens: u32,

    /// Upper bound on a single engine call. Default: 300s.
    pub engine_timeout: Duration,

    /// Engine invocations per entity, first attempt included. Default: `3`.
    pub retry_attempts: u32,

    /// Pause between attempts. Default: 2s.
    pub retry_delay: Duration,

    /// Records buffered per tier before a bulk upsert. Default: `5`.
    pub chunk_size: usize,

    /// Cities researched at once. Default: `1`.
    pub city_concurrency: usize,

    /// Finished runs kept for status queries. Default: `256`.
    pub retained_runs: usize,

    /// Assessment year stamped on records; the current UTC year when unset.
    pub assessment_year: Option<i32>,

    /// When set, every non-probe route requires this key.
    pub api_key: Option<String>,
}

pub const DEFAULT_DATABASE_URL: &str = "sqlite://veridian.db";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

impl Default for Config {
    fn default() -> Self {
        let engine = EngineSettings::default();
        Self {
            port: 8000,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: engine.temperature,
            max_tokens: engine.max_tokens,
            engine_timeout: engine.timeout,
            retry_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            chunk_size: DEFAULT_CHUNK_SIZE,
            city_concurrency: DEFAULT_CITY_CONCURRENCY,
            retained_runs: MAX_RETAINED_RUNS,
            assessment_year: None,
            api_key: None,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "VERIDIAN_PORT";
    const ENV_BIND_ADDR: &'static str = "VERIDIAN_BIND_ADDR";
    const ENV_DATABASE_URL: &'static str = "VERIDIAN_DATABASE_URL";
    const ENV_MODEL: &'static str = "VERIDIAN_MODEL";
    const ENV_TEMPERATURE: &'static str = "VERIDIAN_TEMPERATURE";
    const ENV_MAX_TOKENS: &'static str = "VERIDIAN_MAX_TOKENS";
    const ENV_ENGINE_TIMEOUT: &'static str = "VERIDIAN_ENGINE_TIMEOUT_SECS";
    const ENV_RETRY_ATTEMPTS: &'static str = "VERIDIAN_RETRY_ATTEMPTS";
    const ENV_RETRY_DELAY: &'static str = "VERIDIAN_RETRY_DELAY_MS";
    const ENV_CHUNK_SIZE: &'static str = "VERIDIAN_CHUNK_SIZE";
    const ENV_CITY_CONCURRENCY: &'static str = "VERIDIAN_CITY_CONCURRENCY";
    const ENV_RETAINED_RUNS: &'static str = "VERIDIAN_RETAINED_RUNS";
    const ENV_ASSESSMENT_YEAR: &'static str = "VERIDIAN_ASSESSMENT_YEAR";
    const ENV_API_KEY: &'static str = "VERIDIAN_API_KEY";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let database_url =
            Self::parse_string_from_env(Self::ENV_DATABASE_URL, defaults.database_url);
        let model = Self::parse_string_from_env(Self::ENV_MODEL, defaults.model);
        let temperature = Self::parse_from_env(Self::ENV_TEMPERATURE, defaults.temperature)?;
        let max_tokens = Self::parse_from_env(Self::ENV_MAX_TOKENS, defaults.max_tokens)?;
        let engine_timeout = Duration::from_secs(Self::parse_from_env(
            Self::ENV_ENGINE_TIMEOUT,
            defaults.engine_timeout.as_secs(),
        )?);
        let retry_attempts =
            Self::parse_from_env(Self::ENV_RETRY_ATTEMPTS, defaults.retry_attempts)?;
        let retry_delay = Duration::from_millis(Self::parse_from_env(
            Self::ENV_RETRY_DELAY,
            defaults.retry_delay.as_millis() as u64,
        )?);
        let chunk_size = Self::parse_from_env(Self::ENV_CHUNK_SIZE, defaults.chunk_size)?;
        let city_concurrency =
            Self::parse_from_env(Self::ENV_CITY_CONCURRENCY, defaults.city_concurrency)?;
        let retained_runs = Self::parse_from_env(Self::ENV_RETAINED_RUNS, defaults.retained_runs)?;
        let assessment_year = Self::parse_optional_from_env(Self::ENV_ASSESSMENT_YEAR)?;
        let api_key = Self::parse_optional_string_from_env(Self::ENV_API_KEY);

        Ok(Self {
            port,
            bind_addr,
            database_url,
            model,
            temperature,
            max_tokens,
            engine_timeout,
            retry_attempts,
            retry_delay,
            chunk_size,
            city_concurrency,
            retained_runs,
            assessment_year,
            api_key,
        })
    }

    /// Checks ranges that parsing alone does not enforce.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort {
                value: self.port.to_string(),
            });
        }
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::Empty {
                name: Self::ENV_DATABASE_URL,
            });
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::Empty {
                name: Self::ENV_MODEL,
            });
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_TEMPERATURE,
                reason: "must be between 0 and 2",
            });
        }
        if self.retry_attempts == 0 {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_RETRY_ATTEMPTS,
                reason: "must be at least 1",
            });
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_CHUNK_SIZE,
                reason: "must be at least 1",
            });
        }
        if self.retained_runs == 0 {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_RETAINED_RUNS,
                reason: "must be at least 1",
            });
        }
        if self.city_concurrency == 0 {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_CITY_CONCURRENCY,
                reason: "must be at least 1",
            });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout: self.engine_timeout,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_attempts, self.retry_delay)
    }

    /// Batch settings with every tier enabled.
    pub fn batch_config(&self) -> BatchConfig {
        BatchConfig {
            chunk_size: self.chunk_size,
            city_concurrency: self.city_concurrency,
            tiers: TierSet::all(),
            year: self.assessment_year.unwrap_or_else(current_year),
        }
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name).unwrap_or(default)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_from_env<T: FromStr>(var_name: &'static str, default: T) -> Result<T, ConfigError> {
        Ok(Self::parse_optional_from_env(var_name)?.unwrap_or(default))
    }

    fn parse_optional_from_env<T: FromStr>(
        var_name: &'static str,
    ) -> Result<Option<T>, ConfigError> {
        match Self::parse_optional_string_from_env(var_name) {
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|_| ConfigError::InvalidNumber {
                    name: var_name,
                    value,
                }),
            None => Ok(None),
        }
    }
}
