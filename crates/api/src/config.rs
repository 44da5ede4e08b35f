use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use vidsum_core::config::{parse_opt, parse_or, process_env};
use vidsum_core::error::CoreError;
use vidsum_core::retry::RetryPolicy;

/// Which persistence backend to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    /// Process-local, lost on restart.
    Memory,
}

impl FromStr for StoreKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(StoreKind::Postgres),
            "memory" => Ok(StoreKind::Memory),
            other => Err(CoreError::Validation(format!(
                "Unknown store '{other}'. Must be one of: postgres, memory"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(CoreError::Validation(format!(
                "Unknown log format '{other}'. Must be one of: text, json"
            ))),
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development except
/// `DATABASE_URL`, which is required when `STORE=postgres`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for an in-flight job (default: `30`).
    pub shutdown_timeout_secs: u64,
    pub store: StoreKind,
    pub database_url: Option<String>,
    /// Root for uploads and keyframes, also served under `/static`.
    pub data_dir: PathBuf,
    /// Largest accepted upload body in bytes (default: 512 MiB).
    pub max_upload_bytes: usize,
    /// Backoff applied to storage and upload writes.
    pub retry: RetryPolicy,
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `PORT`                  | `3000`                  |
    /// | `CORS_ORIGINS`          | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                    |
    /// | `STORE`                 | `postgres`              |
    /// | `DATABASE_URL`          | required for postgres   |
    /// | `DATA_DIR`              | `./data`                |
    /// | `MAX_UPLOAD_BYTES`      | `536870912`             |
    /// | `RETRY_MAX_ATTEMPTS`    | `3`                     |
    /// | `RETRY_BASE_DELAY_MS`   | `2000`                  |
    /// | `RETRY_MAX_DELAY_MS`    | `30000`                 |
    /// | `LOG_FORMAT`            | `text`                  |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(&process_env)
    }

    pub fn from_lookup<L>(lookup: &L) -> Result<Self, CoreError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| "0.0.0.0".into());

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let store: StoreKind = parse_or(lookup, "STORE", StoreKind::Postgres)?;
        let database_url = lookup("DATABASE_URL").filter(|u| !u.trim().is_empty());
        if store == StoreKind::Postgres && database_url.is_none() {
            return Err(CoreError::Validation(
                "DATABASE_URL must be set when STORE=postgres".into(),
            ));
        }

        let max_upload_bytes: usize = parse_or(lookup, "MAX_UPLOAD_BYTES", 512 * 1024 * 1024)?;
        if max_upload_bytes == 0 {
            return Err(CoreError::Validation("MAX_UPLOAD_BYTES must be positive".into()));
        }

        let defaults = RetryPolicy::default();
        let retry = RetryPolicy {
            max_retries: parse_or(lookup, "RETRY_MAX_ATTEMPTS", defaults.max_retries)?,
            initial_delay: parse_opt::<u64, _>(lookup, "RETRY_BASE_DELAY_MS")?
                .map_or(defaults.initial_delay, Duration::from_millis),
            max_delay: parse_opt::<u64, _>(lookup, "RETRY_MAX_DELAY_MS")?
                .map_or(defaults.max_delay, Duration::from_millis),
            ..defaults
        };

        Ok(Self {
            host,
            port: parse_or(lookup, "PORT", 3000)?,
            cors_origins,
            request_timeout_secs: parse_or(lookup, "REQUEST_TIMEOUT_SECS", 30)?,
            shutdown_timeout_secs: parse_or(lookup, "SHUTDOWN_TIMEOUT_SECS", 30)?,
            store,
            database_url,
            data_dir: parse_or(lookup, "DATA_DIR", PathBuf::from("./data"))?,
            max_upload_bytes,
            retry,
            log_format: parse_or(lookup, "LOG_FORMAT", LogFormat::Text)?,
        })
    }
}
