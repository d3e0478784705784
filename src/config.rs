//! Startup configuration.
//!
//! Configuration is read from the environment exactly once, validated, and
//! carried as a plain struct from then on — nothing in the request path
//! consults the environment. Tests construct a [`Config`] literal (or call
//! [`Config::from_raw_level`]) instead of mutating process state.

use std::env;

use crate::error::Error;
use crate::logger::Level;

/// Environment variable holding the numeric log severity threshold.
pub const LOG_LEVEL_VAR: &str = "LOG_LEVEL";

/// Server configuration.
///
/// ```rust
/// use allium::{Config, Level};
///
/// let config = Config::default();
/// assert!(config.log_requests);
/// assert_eq!(config.log_level, Level::Info);
/// ```
#[derive(Clone, Debug)]
pub struct Config {
    /// Prepend the request-logging middleware to the chain (default: true).
    pub log_requests: bool,
    /// Validated severity threshold for the server's logger.
    pub log_level: Level,
    /// True when `log_level` came from the absent-variable default rather
    /// than an explicit setting. Drives the startup normalization line.
    pub log_level_defaulted: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_requests: true,
            log_level: Level::Info,
            log_level_defaulted: false,
        }
    }
}

impl Config {
    /// Reads and validates `LOG_LEVEL` from the process environment.
    ///
    /// An invalid value is fatal: the returned [`Error::Config`] is meant to
    /// terminate startup before anything binds a socket. The caller decides
    /// how to exit; the validation itself never touches the process.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_raw_level(env::var(LOG_LEVEL_VAR).ok().as_deref())
    }

    /// Validates a raw `LOG_LEVEL` value.
    ///
    /// - absent → defaults to [`Level::Info`], marked as defaulted;
    /// - not an integer → `Error::Config`;
    /// - an integer outside {0, 10, 20, 30, 40, 50} → `Error::Config`;
    /// - `0` (NOTSET) → `Error::Config` — disabling logging by configuration
    ///   is rejected rather than silently honored.
    pub fn from_raw_level(raw: Option<&str>) -> Result<Self, Error> {
        let Some(raw) = raw else {
            return Ok(Self {
                log_level_defaulted: true,
                ..Self::default()
            });
        };

        let value: i64 = raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{LOG_LEVEL_VAR} is not a number")))?;

        let level = Level::from_value(value)
            .filter(|level| *level != Level::NotSet)
            .ok_or_else(|| Error::Config(format!("{LOG_LEVEL_VAR} is not in the allowed range")))?;

        Ok(Self {
            log_level: level,
            log_level_defaulted: false,
            ..Self::default()
        })
    }
}
