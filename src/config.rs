//! Service configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).
//!
//! | Variable                   | Default                          |
//! |----------------------------|----------------------------------|
//! | `LISTEN_ADDR`              | `0.0.0.0:8080`                   |
//! | `STORE_BACKEND`            | `sqlite` (`sqlite` or `memory`)  |
//! | `DATABASE_URL`             | `sqlite://calendar.db?mode=rwc`  |
//! | `DATABASE_MAX_CONNECTIONS` | `5`                              |
//! | `SHUTDOWN_TIMEOUT_SECS`    | `3`                              |
//! | `REQUEST_TIMEOUT_SECS`     | `5`                              |
//! | `LOG_FORMAT`               | `text` (`text` or `json`)        |

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::server::DEFAULT_SHUTDOWN_TIMEOUT;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DATABASE_URL: &str = "sqlite://calendar.db?mode=rwc";

/// Configuration failures detected at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `LISTEN_ADDR` is not a socket address.
    #[error("invalid LISTEN_ADDR {value:?}: {source}")]
    ListenAddr {
        /// Raw value.
        value: String,
        /// Parse failure.
        source: std::net::AddrParseError,
    },

    /// A variable holds a value outside its allowed set.
    #[error("invalid {key} {value:?}: expected one of {expected}")]
    UnknownValue {
        /// Variable name.
        key: &'static str,
        /// Raw value.
        value: String,
        /// Accepted values.
        expected: &'static str,
    },
}

/// Event store engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// SQLite through `sqlx`.
    Sqlite,
    /// Process-local map; contents are lost on exit.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            _ => Err(ConfigError::UnknownValue {
                key: "STORE_BACKEND",
                value: s.to_string(),
                expected: "sqlite, memory",
            }),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sqlite => f.write_str("sqlite"),
            Self::Memory => f.write_str("memory"),
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::UnknownValue {
                key: "LOG_FORMAT",
                value: s.to_string(),
                expected: "text, json",
            }),
        }
    }
}

/// Top-level service configuration.
///
/// Loaded once at startup via [`CalendarConfig::from_env`] and passed down
/// by value.
#[derive(Debug, Clone)]
pub struct CalendarConfig {
    /// Socket address to bind the HTTP server to.
    pub listen_addr: SocketAddr,

    /// Event store engine.
    pub store_backend: StoreBackend,

    /// SQLite connection string, used with [`StoreBackend::Sqlite`].
    pub database_url: String,

    /// Maximum number of database connections in the pool.
    pub database_max_connections: u32,

    /// Budget for draining in-flight requests on shutdown.
    pub shutdown_timeout: Duration,

    /// Budget for a single request.
    pub request_timeout: Duration,

    /// Log line format.
    pub log_format: LogFormat,
}

impl CalendarConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file first.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `LISTEN_ADDR` is not a socket address or
    /// `STORE_BACKEND` / `LOG_FORMAT` hold an unknown value.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    ///
    /// Missing keys and malformed numbers fall back to defaults.
    ///
    /// # Errors
    ///
    /// Same as [`CalendarConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_addr = lookup("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = raw_addr
            .trim()
            .parse()
            .map_err(|source| ConfigError::ListenAddr {
                value: raw_addr.clone(),
                source,
            })?;

        let store_backend = match lookup("STORE_BACKEND") {
            Some(value) => value.parse()?,
            None => StoreBackend::Sqlite,
        };
        let log_format = match lookup("LOG_FORMAT") {
            Some(value) => value.parse()?,
            None => LogFormat::Text,
        };

        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let database_max_connections = parse_env(&lookup, "DATABASE_MAX_CONNECTIONS", 5);
        let shutdown_timeout = Duration::from_secs(parse_env(
            &lookup,
            "SHUTDOWN_TIMEOUT_SECS",
            DEFAULT_SHUTDOWN_TIMEOUT.as_secs(),
        ));
        let request_timeout = Duration::from_secs(parse_env(&lookup, "REQUEST_TIMEOUT_SECS", 5));

        Ok(Self {
            listen_addr,
            store_backend,
            database_url,
            database_max_connections,
            shutdown_timeout,
            request_timeout,
            log_format,
        })
    }
}

/// Parses a variable as `T`, returning `default` on missing or invalid
/// values.
fn parse_env<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
