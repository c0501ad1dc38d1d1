//! Configuration loading and representation.
//!
//! Everything comes from environment variables; unset variables fall back to
//! development defaults, malformed ones are rejected.

use std::net::SocketAddr;
use std::time::Duration;

use boardkeep_resilience::RetryPolicy;
use thiserror::Error;
use tracing::warn;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {var}={value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Where the entity store lives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreConfig {
    /// `None` selects the in-memory store.
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

/// Presence defaults used when a request names no user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresenceConfig {
    pub user: Option<String>,
    pub targets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub store: StoreConfig,
    pub presence: PresenceConfig,
    pub retry: RetryPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            store: StoreConfig::default(),
            presence: PresenceConfig::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_raw = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
            var: "BIND_ADDR",
            value: bind_raw.clone(),
            reason: e.to_string(),
        })?;

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        let store = StoreConfig {
            base_url: get("ENTITY_STORE_URL"),
            api_key: get("ENTITY_STORE_API_KEY"),
        };

        let presence = PresenceConfig {
            user: get("PRESENCE_USER"),
            targets: get("PRESENCE_TARGETS")
                .map(|raw| split_list(&raw))
                .unwrap_or_default(),
        };

        let defaults = RetryPolicy::default();
        let max_retries = parse_var(&get, "RETRY_MAX_RETRIES")?.unwrap_or(defaults.max_retries);
        let base_delay = parse_var::<u64, _>(&get, "RETRY_BASE_DELAY_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.base_delay);
        let max_delay = parse_var::<u64, _>(&get, "RETRY_MAX_DELAY_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.max_delay);

        Ok(Self {
            bind_addr,
            jwt_secret,
            store,
            presence,
            retry: RetryPolicy::exponential(max_retries, base_delay, max_delay),
        })
    }
}

fn parse_var<T, G>(get: &G, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(var) {
        None => Ok(None),
        Some(raw) => raw.parse::<T>().map(Some).map_err(|e| ConfigError::Invalid {
            var,
            value: raw,
            reason: e.to_string(),
        }),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(load(&[]).unwrap(), AppConfig::default());
    }

    #[test]
    fn reads_every_variable() {
        let config = load(&[
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("JWT_SECRET", "s3cret"),
            ("ENTITY_STORE_URL", "https://store.example/api"),
            ("ENTITY_STORE_API_KEY", "k"),
            ("PRESENCE_USER", "bona"),
            ("PRESENCE_TARGETS", " bona, missdeecash ,,"),
            ("RETRY_MAX_RETRIES", "3"),
            ("RETRY_BASE_DELAY_MS", "100"),
            ("RETRY_MAX_DELAY_MS", "1000"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.store.base_url.as_deref(), Some("https://store.example/api"));
        assert_eq!(config.store.api_key.as_deref(), Some("k"));
        assert_eq!(config.presence.user.as_deref(), Some("bona"));
        assert_eq!(config.presence.targets, ["bona", "missdeecash"]);
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.retry.base_delay, Duration::from_millis(100));
        assert_eq!(config.retry.max_delay, Duration::from_secs(1));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = load(&[("ENTITY_STORE_URL", "  "), ("PRESENCE_USER", "")]).unwrap();
        assert_eq!(config.store.base_url, None);
        assert_eq!(config.presence.user, None);
    }

    #[test]
    fn malformed_values_are_rejected() {
        let err = load(&[("RETRY_MAX_RETRIES", "lots")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "RETRY_MAX_RETRIES", .. }));

        let err = load(&[("BIND_ADDR", "localhost")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "BIND_ADDR", .. }));
    }
}
