//! Process configuration from the environment.
//!
//! Every knob has a documented default; an empty variable counts as unset
//! (some deployment platforms export empty strings). Malformed values are
//! rejected at startup.

use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

/// A variable was set to something unparseable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value for {var}: {value:?}")]
pub struct ConfigError {
    var: &'static str,
    value: String,
}

/// Runtime configuration of the service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address to bind (HOST, default 127.0.0.1).
    pub host: IpAddr,
    /// Port to bind (PORT, default 8080).
    pub port: u16,
    /// Upstream credential (AIRLY_API_KEY, no default).
    pub airly_api_key: String,
    /// Per-minute quota of the credential (AIRLY_RATE_LIMIT_MINUTE, default 50).
    pub rate_limit_minute: u32,
    /// Per-day quota of the credential (AIRLY_RATE_LIMIT_DAY, default 1000).
    pub rate_limit_day: u32,
    /// How long a cached measurement stays servable past its own validity
    /// window (MEASUREMENT_CACHE_TTL_SECS, default 900).
    pub measurement_ttl_secs: i64,
    /// Catalog sync cadence (SYNC_INTERVAL_SECS, default daily).
    pub sync_interval_secs: u64,
    /// Stale-station cleanup cadence (CLEANUP_INTERVAL_SECS, default daily).
    pub cleanup_interval_secs: u64,
    /// Age in days past which un-resynced stations are purged
    /// (CLEANUP_DAYS_BACK, default 2).
    pub cleanup_days_back: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8080,
            airly_api_key: String::new(),
            rate_limit_minute: 50,
            rate_limit_day: 1000,
            measurement_ttl_secs: 900,
            sync_interval_secs: 24 * 60 * 60,
            cleanup_interval_secs: 24 * 60 * 60,
            cleanup_days_back: 2,
        }
    }
}

impl AppConfig {
    /// Load the configuration from the environment, falling back to the
    /// defaults above for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            host: parse_var("HOST", defaults.host)?,
            port: parse_var("PORT", defaults.port)?,
            airly_api_key: std::env::var("AIRLY_API_KEY").unwrap_or_default(),
            rate_limit_minute: parse_var("AIRLY_RATE_LIMIT_MINUTE", defaults.rate_limit_minute)?,
            rate_limit_day: parse_var("AIRLY_RATE_LIMIT_DAY", defaults.rate_limit_day)?,
            measurement_ttl_secs: parse_var(
                "MEASUREMENT_CACHE_TTL_SECS",
                defaults.measurement_ttl_secs,
            )?,
            sync_interval_secs: parse_var("SYNC_INTERVAL_SECS", defaults.sync_interval_secs)?,
            cleanup_interval_secs: parse_var(
                "CLEANUP_INTERVAL_SECS",
                defaults.cleanup_interval_secs,
            )?,
            cleanup_days_back: parse_var("CLEANUP_DAYS_BACK", defaults.cleanup_days_back)?,
        })
    }
}

fn parse_var<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Ok(value) if !value.is_empty() => value
            .parse()
            .map_err(|_| ConfigError { var, value }),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.host, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(config.port, 8080);
        assert_eq!(config.rate_limit_minute, 50);
        assert_eq!(config.rate_limit_day, 1000);
        assert_eq!(config.measurement_ttl_secs, 900);
        assert_eq!(config.sync_interval_secs, 86400);
        assert_eq!(config.cleanup_interval_secs, 86400);
        assert_eq!(config.cleanup_days_back, 2);
    }

    #[test]
    fn unset_variable_falls_back() {
        assert_eq!(parse_var("AIRQ_TEST_UNSET_VAR", 7u16).unwrap(), 7);
    }
}
