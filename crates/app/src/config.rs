use std::net::SocketAddr;
use std::time::Duration;

use keja_core::domain::criteria::PageLimits;
use keja_feed::{FeedOptions, DEFAULT_PAGE_SIZE};
use keja_feed::viewport::DEFAULT_PROXIMITY_THRESHOLD;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: SocketAddr,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub page_limits: PageLimits,
    pub token_secret: Option<String>,
    pub cors_allow_origins: Vec<String>,
    pub api_base_url: String,
    pub feed_page_size: u32,
    pub feed_timeout: Duration,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid socket address: {0}")]
    InvalidSocket(String),
    #[error("invalid integer for {0}: {1}")]
    InvalidNumber(&'static str, String),
    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
    #[error("dotenv error: {0}")]
    Dotenv(#[from] dotenvy::Error),
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };
        let http_addr_raw = env.string("KEJA_HTTP_ADDR", "127.0.0.1:8080");
        let http_addr = http_addr_raw
            .parse()
            .map_err(|_| ConfigError::InvalidSocket(http_addr_raw.clone()))?;
        let database_url = env.optional("KEJA_DATABASE_URL");
        let db_max_connections = env.positive("KEJA_DB_MAX_CONNECTIONS", 5)?;
        let max_limit = env.positive("KEJA_MAX_PAGE_LIMIT", 50)?;
        let default_limit = env.positive("KEJA_DEFAULT_PAGE_LIMIT", 20)?;
        if default_limit > max_limit {
            return Err(ConfigError::InvalidValue(
                "KEJA_DEFAULT_PAGE_LIMIT",
                format!("{default_limit} exceeds KEJA_MAX_PAGE_LIMIT {max_limit}"),
            ));
        }
        let token_secret = env.optional("KEJA_TOKEN_SECRET");
        let cors_allow_origins = env
            .optional("KEJA_CORS_ALLOW_ORIGINS")
            .map(|raw| split_list(&raw))
            .unwrap_or_default();
        let api_base_url = env.string("KEJA_API_BASE_URL", "http://127.0.0.1:8080");
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue("KEJA_API_BASE_URL", api_base_url));
        }
        let feed_page_size = env.positive("KEJA_FEED_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        let feed_timeout_secs = env.positive("KEJA_FEED_TIMEOUT_SECS", 15)?;

        Ok(Self {
            http_addr,
            database_url,
            db_max_connections,
            page_limits: PageLimits {
                default_limit,
                max_limit,
            },
            token_secret,
            cors_allow_origins,
            api_base_url,
            feed_page_size,
            feed_timeout: Duration::from_secs(u64::from(feed_timeout_secs)),
        })
    }

    pub fn feed_options(&self) -> FeedOptions {
        FeedOptions {
            page_size: self.feed_page_size,
            proximity_threshold: DEFAULT_PROXIMITY_THRESHOLD,
        }
    }
}

/// Loads `.env` from the working directory when present. Variables already set in
/// the environment win.
pub fn load_dotenv() -> Result<(), ConfigError> {
    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(err.into()),
    }
}

struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &'static str) -> Option<String> {
        let value = (self.lookup)(key)?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    fn string(&self, key: &'static str, default: &'static str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn positive(&self, key: &'static str, default: u32) -> Result<u32, ConfigError> {
        let Some(raw) = self.optional(key) else {
            return Ok(default);
        };
        match raw.parse::<u32>() {
            Ok(value) if value > 0 => Ok(value),
            _ => Err(ConfigError::InvalidNumber(key, raw)),
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.http_addr.to_string(), "127.0.0.1:8080");
        assert!(config.database_url.is_none());
        assert!(config.token_secret.is_none());
        assert_eq!(config.page_limits.max_limit, 50);
        assert_eq!(config.page_limits.default_limit, 20);
        assert_eq!(config.feed_page_size, 6);
        assert_eq!(config.feed_timeout, Duration::from_secs(15));
        assert!(config.cors_allow_origins.is_empty());
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = config_from(&[("KEJA_DATABASE_URL", "  "), ("KEJA_TOKEN_SECRET", "")]).unwrap();
        assert!(config.database_url.is_none());
        assert!(config.token_secret.is_none());
    }

    #[test]
    fn cors_origins_are_split_and_trimmed() {
        let config = config_from(&[(
            "KEJA_CORS_ALLOW_ORIGINS",
            "https://keja.example, http://localhost:3000 ,",
        )])
        .unwrap();
        assert_eq!(
            config.cors_allow_origins,
            vec!["https://keja.example", "http://localhost:3000"]
        );
    }

    #[test]
    fn rejects_zero_and_garbage_numbers() {
        assert!(matches!(
            config_from(&[("KEJA_MAX_PAGE_LIMIT", "0")]),
            Err(ConfigError::InvalidNumber("KEJA_MAX_PAGE_LIMIT", _))
        ));
        assert!(matches!(
            config_from(&[("KEJA_FEED_PAGE_SIZE", "six")]),
            Err(ConfigError::InvalidNumber("KEJA_FEED_PAGE_SIZE", _))
        ));
    }

    #[test]
    fn default_limit_cannot_exceed_max() {
        let err = config_from(&[("KEJA_MAX_PAGE_LIMIT", "10"), ("KEJA_DEFAULT_PAGE_LIMIT", "20")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("KEJA_DEFAULT_PAGE_LIMIT", _)));
    }

    #[test]
    fn rejects_bad_socket_and_base_url() {
        assert!(matches!(
            config_from(&[("KEJA_HTTP_ADDR", "localhost")]),
            Err(ConfigError::InvalidSocket(_))
        ));
        assert!(matches!(
            config_from(&[("KEJA_API_BASE_URL", "ftp://example")]),
            Err(ConfigError::InvalidValue("KEJA_API_BASE_URL", _))
        ));
    }
}
