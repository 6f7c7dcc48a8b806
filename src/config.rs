//! Workspace configuration parsed from environment variables.

use std::ops::RangeInclusive;
use std::path::PathBuf;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_HISTORY_PATH: &str = "hydrocast_history.json";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MIN_YEAR: i32 = 2000;
pub const DEFAULT_MAX_YEAR: i32 = 2100;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("year range is inverted: min {min} > max {max}")]
    InvertedYearRange { min: i32, max: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for GatewayTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

/// Forecast target years the service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

impl YearRange {
    /// # Errors
    ///
    /// Returns an error if `min > max`.
    pub fn new(min: i32, max: i32) -> Result<Self, ConfigError> {
        if min > max {
            return Err(ConfigError::InvertedYearRange { min, max });
        }
        Ok(Self { min, max })
    }

    #[must_use]
    pub fn contains(&self, year: i32) -> bool {
        self.range().contains(&year)
    }

    #[must_use]
    pub fn range(&self) -> RangeInclusive<i32> {
        self.min..=self.max
    }
}

impl Default for YearRange {
    fn default() -> Self {
        Self { min: DEFAULT_MIN_YEAR, max: DEFAULT_MAX_YEAR }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceConfig {
    pub api_base_url: String,
    pub history_path: PathBuf,
    pub timeouts: GatewayTimeouts,
    pub years: YearRange,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            history_path: PathBuf::from(DEFAULT_HISTORY_PATH),
            timeouts: GatewayTimeouts::default(),
            years: YearRange::default(),
        }
    }
}

impl WorkspaceConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `HYDROCAST_API_BASE_URL`: prediction service root (default `http://127.0.0.1:8000`)
    /// - `HYDROCAST_HISTORY_PATH`: history file (default `hydrocast_history.json`)
    /// - `HYDROCAST_REQUEST_TIMEOUT_SECS`: default 30
    /// - `HYDROCAST_CONNECT_TIMEOUT_SECS`: default 10
    /// - `HYDROCAST_MIN_YEAR` / `HYDROCAST_MAX_YEAR`: default 2000 / 2100
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting year range is inverted.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup. Unparsable numbers fall
    /// back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting year range is inverted.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_base_url = lookup("HYDROCAST_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();
        let history_path =
            lookup("HYDROCAST_HISTORY_PATH").map_or_else(|| PathBuf::from(DEFAULT_HISTORY_PATH), PathBuf::from);
        let timeouts = GatewayTimeouts {
            request_secs: parse_or(&lookup, "HYDROCAST_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_or(&lookup, "HYDROCAST_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        let years = YearRange::new(
            parse_or(&lookup, "HYDROCAST_MIN_YEAR", DEFAULT_MIN_YEAR),
            parse_or(&lookup, "HYDROCAST_MAX_YEAR", DEFAULT_MAX_YEAR),
        )?;

        Ok(Self { api_base_url, history_path, timeouts, years })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
