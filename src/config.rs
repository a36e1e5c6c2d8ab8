//! Environment configuration

use std::{env, fmt::Display, str::FromStr, time::Duration};

use tracing::info;

use crate::pricing::RateLookupPolicy;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable {0} is required")]
    Missing(&'static str),

    #[error("Invalid {key} value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub pricing_cache_ttl: Duration,
    pub rate_lookup_policy: RateLookupPolicy,
}

impl Config {
    /// Read configuration from the process environment (after `.env`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        Ok(Self {
            database_url,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            db_max_connections: try_load(&lookup, "DB_MAX_CONNECTIONS", "5")?,
            pricing_cache_ttl: Duration::from_secs(try_load(&lookup, "PRICING_CACHE_TTL_SECS", "600")?),
            rate_lookup_policy: parse_policy(
                &lookup("RATE_LOOKUP_POLICY").unwrap_or_else(|| "zero".to_string()),
            )?,
        })
    }
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value,
    })
}

fn parse_policy(raw: &str) -> Result<RateLookupPolicy, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "zero" | "zero_on_miss" => Ok(RateLookupPolicy::ZeroOnMiss),
        "error" | "error_on_miss" => Ok(RateLookupPolicy::ErrorOnMiss),
        other => Err(ConfigError::Invalid {
            key: "RATE_LOOKUP_POLICY",
            value: other.to_string(),
            reason: "expected 'zero' or 'error'".to_string(),
        }),
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
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/safes")])).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.pricing_cache_ttl, Duration::from_secs(600));
        assert_eq!(config.rate_lookup_policy, RateLookupPolicy::ZeroOnMiss);
    }

    #[test]
    fn test_database_url_required() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/safes"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("DB_MAX_CONNECTIONS", "12"),
            ("PRICING_CACHE_TTL_SECS", "30"),
            ("RATE_LOOKUP_POLICY", "Error"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.db_max_connections, 12);
        assert_eq!(config.pricing_cache_ttl, Duration::from_secs(30));
        assert_eq!(config.rate_lookup_policy, RateLookupPolicy::ErrorOnMiss);
    }

    #[test]
    fn test_invalid_values_are_errors() {
        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/safes"),
            ("DB_MAX_CONNECTIONS", "many"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("DB_MAX_CONNECTIONS"));

        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/safes"),
            ("RATE_LOOKUP_POLICY", "maybe"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("RATE_LOOKUP_POLICY"));
    }
}
