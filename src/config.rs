//! Startup configuration, read from the environment once.

use std::time::Duration;

use crate::error::ConfigError;
use crate::logging::{LogConfig, LogFormat};

pub const SOURCE_VAR: &str = "REMAP_SOURCE";
pub const TIMEOUT_VAR: &str = "REMAP_FETCH_TIMEOUT_SECS";
pub const ATTEMPTS_VAR: &str = "REMAP_FETCH_ATTEMPTS";
pub const LOG_VAR: &str = "REMAP_LOG";
pub const LOG_FORMAT_VAR: &str = "REMAP_LOG_FORMAT";

const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    pub timeout: Duration,
    /// Total attempts for an HTTP fetch, the first one included.
    pub max_attempts: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_attempts: DEFAULT_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Dataset source used by `fetch` when the request names none.
    pub source: Option<String>,
    pub fetch: FetchConfig,
    pub log: LogConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let timeout_secs = match get(TIMEOUT_VAR) {
            Some(v) => parse_number(TIMEOUT_VAR, &v)?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        let max_attempts = match get(ATTEMPTS_VAR) {
            Some(v) => parse_number(ATTEMPTS_VAR, &v)? as usize,
            None => DEFAULT_ATTEMPTS,
        };

        let format = match get(LOG_FORMAT_VAR).as_deref() {
            None | Some("compact") => LogFormat::Compact,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::InvalidLogFormat {
                    var: LOG_FORMAT_VAR,
                    value: other.to_string(),
                })
            }
        };

        let mut log = LogConfig {
            format,
            ..LogConfig::default()
        };
        if let Some(filter) = get(LOG_VAR) {
            log.filter = filter;
        }

        Ok(Config {
            source: get(SOURCE_VAR),
            fetch: FetchConfig {
                timeout: Duration::from_secs(timeout_secs),
                max_attempts,
            },
            log,
        })
    }
}

fn parse_number(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidNumber {
        var,
        value: value.to_string(),
    })
}
