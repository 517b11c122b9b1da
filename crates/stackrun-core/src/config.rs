//! Handler configuration.
//!
//! Everything job-specific arrives in the event. What is left here are
//! deployment-wide tuning knobs read from the environment once at startup;
//! every one has a default.

use std::env;
use std::time::Duration;

pub const CALL_TIMEOUT_ENV: &str = "STACKRUN_CALL_TIMEOUT_MS";
pub const MAX_TRANSIENT_RETRIES_ENV: &str = "STACKRUN_MAX_TRANSIENT_RETRIES";
pub const LOG_FILTER_ENV: &str = "STACKRUN_LOG";
pub const LOG_FORMAT_ENV: &str = "STACKRUN_LOG_FORMAT";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// Human-readable lines.
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. `info` or `stackrun_core=debug,warn`.
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Json,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    /// Upper bound for any single network call.
    pub call_timeout: Duration,

    /// Consecutive transient errors tolerated before the job is failed.
    pub max_transient_retries: u32,

    pub log: LogConfig,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(10),
            max_transient_retries: 5,
            log: LogConfig::default(),
        }
    }
}

impl HandlerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source (tests pass a closure over a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let call_timeout = match lookup(CALL_TIMEOUT_ENV) {
            Some(v) => match v.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => Duration::from_millis(ms),
                _ => return Err(invalid(CALL_TIMEOUT_ENV, "a positive number of milliseconds", v)),
            },
            None => defaults.call_timeout,
        };

        let max_transient_retries = match lookup(MAX_TRANSIENT_RETRIES_ENV) {
            Some(v) => v
                .trim()
                .parse::<u32>()
                .map_err(|_| invalid(MAX_TRANSIENT_RETRIES_ENV, "a non-negative integer", v))?,
            None => defaults.max_transient_retries,
        };

        let filter = lookup(LOG_FILTER_ENV)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.log.filter);

        let format = match lookup(LOG_FORMAT_ENV).as_deref().map(str::trim) {
            None | Some("json") => LogFormat::Json,
            Some("text") => LogFormat::Text,
            Some(other) => return Err(invalid(LOG_FORMAT_ENV, "`json` or `text`", other.to_string())),
        };

        Ok(Self {
            call_timeout,
            max_transient_retries,
            log: LogConfig { filter, format },
        })
    }
}

fn invalid(name: &'static str, expected: &'static str, value: String) -> ConfigError {
    ConfigError::Invalid {
        name,
        expected,
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = HandlerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, HandlerConfig::default());
        assert_eq!(config.call_timeout, Duration::from_secs(10));
        assert_eq!(config.max_transient_retries, 5);
        assert_eq!(config.log.format, LogFormat::Json);
    }

    #[test]
    fn reads_every_variable() {
        let config = HandlerConfig::from_lookup(lookup(&[
            (CALL_TIMEOUT_ENV, "2500"),
            (MAX_TRANSIENT_RETRIES_ENV, "2"),
            (LOG_FILTER_ENV, "stackrun_core=debug"),
            (LOG_FORMAT_ENV, "text"),
        ]))
        .unwrap();
        assert_eq!(config.call_timeout, Duration::from_millis(2500));
        assert_eq!(config.max_transient_retries, 2);
        assert_eq!(config.log.filter, "stackrun_core=debug");
        assert_eq!(config.log.format, LogFormat::Text);
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = HandlerConfig::from_lookup(lookup(&[(CALL_TIMEOUT_ENV, "0")])).unwrap_err();
        assert!(err.to_string().contains(CALL_TIMEOUT_ENV));
    }

    #[test]
    fn rejects_garbage() {
        assert!(HandlerConfig::from_lookup(lookup(&[(MAX_TRANSIENT_RETRIES_ENV, "-1")])).is_err());
        assert!(HandlerConfig::from_lookup(lookup(&[(LOG_FORMAT_ENV, "xml")])).is_err());
    }
}
