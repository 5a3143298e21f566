//! Typed configuration from environment variables.
//!
//! Loads once at startup and fails fast on values that do not parse. The
//! canned workload token is wrapped in `secrecy::SecretString` so it never
//! reaches a log line.

pub mod secrets;

use std::str::FromStr;

use crate::error::{Error, Result};
use crate::executor::stubs::DEFAULT_CANNED_TOKEN;
use crate::executor::{DEFAULT_PARALLELISM, ExecutorConfig};
use secrets::SecretString;

#[derive(Debug)]
pub struct Config {
    /// Executor module path or alias. `None` selects the default executor.
    pub executor: Option<String>,
    pub parallelism: usize,
    pub do_update: bool,
    pub token: SecretString,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            executor: std::env::var("MOCKEXEC_EXECUTOR").ok(),
            parallelism: parsed_var("MOCKEXEC_PARALLELISM")?.unwrap_or(DEFAULT_PARALLELISM),
            do_update: parsed_var("MOCKEXEC_DO_UPDATE")?.unwrap_or(true),
            token: SecretString::from(
                std::env::var("MOCKEXEC_TOKEN").unwrap_or_else(|_| DEFAULT_CANNED_TOKEN.to_string()),
            ),
            otel_endpoint: std::env::var("OTEL_ENDPOINT").ok(),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Settings for building an executor.
    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            parallelism: self.parallelism,
            do_update: self.do_update,
            token: self.token.clone(),
        }
    }
}

/// Read and parse an optional variable. Unset is `None`; set but invalid is an
/// error.
fn parsed_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::Config(format!("environment variable {name}={raw:?}: {e}"))),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(Error::Config(format!("environment variable {name}: {e}"))),
    }
}
