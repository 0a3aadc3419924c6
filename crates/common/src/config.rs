//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

const DEFAULT_JWKS_CACHE_TTL_SECS: u64 = 600;
const DEFAULT_JWKS_HTTP_TIMEOUT_SECS: u64 = 5;
const DEFAULT_PRAYED_WINDOW_HOURS: i32 = 12;
const DEFAULT_PRAYED_WINDOW_MAX_HOURS: i32 = 168;
const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_RATE_LIMIT_REQUESTS: u32 = 120;
const DEFAULT_RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

/// Frontend dev servers allowed when `CORS_ALLOWED_ORIGINS` is unset
const DEFAULT_CORS_ALLOWED_ORIGINS: [&str; 4] = [
    "http://localhost:5173",
    "http://127.0.0.1:5173",
    "http://localhost:5174",
    "http://127.0.0.1:5174",
];

/// Log output format selected by `LOG_FORMAT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database connection URL (PostgreSQL)
    pub database_url: String,
    pub database_max_connections: u32,

    /// Token issuer, compared after trimming trailing slashes
    pub jwt_issuer: String,
    pub jwks_url: String,
    pub jwks_cache_ttl: Duration,
    pub jwks_http_timeout: Duration,

    /// Rolling window for repeated prayer actions
    pub prayed_window_hours: i32,
    pub prayed_window_max_hours: i32,

    /// Per client IP: at most `rate_limit_requests` per `rate_limit_window`
    pub rate_limit_requests: u32,
    pub rate_limit_window: Duration,

    /// Runtime configuration
    pub cors_allowed_origins: Vec<String>,
    pub rust_log: String,
    pub log_format: LogFormat,
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow::anyhow!("{} is required", key))
        };

        let config = Self {
            database_url: required("DATABASE_URL")?,
            database_max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS),

            jwt_issuer: required("JWT_ISSUER")?,
            jwks_url: required("JWKS_URL")?,
            jwks_cache_ttl: Duration::from_secs(
                lookup("JWKS_CACHE_TTL_SECS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_JWKS_CACHE_TTL_SECS),
            ),
            jwks_http_timeout: Duration::from_secs(
                lookup("JWKS_HTTP_TIMEOUT_SECS")
                    .and_then(|v| v.parse().ok())
                    .filter(|secs: &u64| *secs > 0)
                    .unwrap_or(DEFAULT_JWKS_HTTP_TIMEOUT_SECS),
            ),

            prayed_window_hours: lookup("PRAYED_WINDOW_HOURS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PRAYED_WINDOW_HOURS),
            prayed_window_max_hours: lookup("PRAYED_WINDOW_MAX_HOURS")
                .and_then(|v| v.parse().ok())
                .filter(|hours: &i32| *hours >= 1)
                .unwrap_or(DEFAULT_PRAYED_WINDOW_MAX_HOURS),

            rate_limit_requests: lookup("RATE_LIMIT_REQUESTS")
                .and_then(|v| v.parse().ok())
                .filter(|requests: &u32| *requests > 0)
                .unwrap_or(DEFAULT_RATE_LIMIT_REQUESTS),
            rate_limit_window: lookup("RATE_LIMIT_WINDOW")
                .and_then(|v| parse_window(&v))
                .unwrap_or(DEFAULT_RATE_LIMIT_WINDOW),

            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|origin| origin.trim().to_string())
                        .filter(|origin| !origin.is_empty())
                        .collect::<Vec<_>>()
                })
                .filter(|origins| !origins.is_empty())
                .unwrap_or_else(|| {
                    DEFAULT_CORS_ALLOWED_ORIGINS
                        .iter()
                        .map(|origin| origin.to_string())
                        .collect()
                }),
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "parish=debug,info".to_string()),
            log_format: lookup("LOG_FORMAT")
                .map(|v| LogFormat::parse(&v))
                .unwrap_or(LogFormat::Pretty),
            port: lookup("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PORT),
        };

        Ok(config)
    }
}

/// Parse `90`, `90s`, `15m` or `1h`; zero and garbage yield `None`
fn parse_window(value: &str) -> Option<Duration> {
    let value = value.trim();
    let (digits, unit) = match value.find(|c: char| !c.is_ascii_digit()) {
        Some(split) => value.split_at(split),
        None => (value, "s"),
    };

    let amount: u64 = digits.parse().ok()?;
    let secs = match unit {
        "s" => amount,
        "m" => amount.checked_mul(60)?,
        "h" => amount.checked_mul(3600)?,
        _ => return None,
    };

    (secs > 0).then(|| Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: &[(&str, &str)] = &[
        ("DATABASE_URL", "postgres://localhost/parish"),
        ("JWT_ISSUER", "https://auth.example.com/auth/v1"),
        ("JWKS_URL", "https://auth.example.com/auth/v1/.well-known/jwks.json"),
    ];

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup_from(REQUIRED)).unwrap();
        assert_eq!(config.jwks_cache_ttl, Duration::from_secs(600));
        assert_eq!(config.jwks_http_timeout, Duration::from_secs(5));
        assert_eq!(config.prayed_window_hours, 12);
        assert_eq!(config.prayed_window_max_hours, 168);
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.rate_limit_requests, 120);
        assert_eq!(config.rate_limit_window, Duration::from_secs(60));
        assert_eq!(
            config.cors_allowed_origins,
            vec![
                "http://localhost:5173",
                "http://127.0.0.1:5173",
                "http://localhost:5174",
                "http://127.0.0.1:5174",
            ]
        );
    }

    #[test]
    fn test_config_missing_required_var() {
        let err = Config::from_lookup(lookup_from(&REQUIRED[..2])).unwrap_err();
        assert!(err.to_string().contains("JWKS_URL"));
    }

    #[test]
    fn test_config_blank_required_var_is_missing() {
        let mut pairs = REQUIRED.to_vec();
        pairs[1] = ("JWT_ISSUER", "   ");
        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(err.to_string().contains("JWT_ISSUER"));
    }

    #[test]
    fn test_config_overrides() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend_from_slice(&[
            ("JWKS_CACHE_TTL_SECS", "30"),
            ("PRAYED_WINDOW_HOURS", "24"),
            ("CORS_ALLOWED_ORIGINS", "http://localhost:5173, https://parish.app,"),
            ("LOG_FORMAT", "JSON"),
            ("PORT", "not-a-port"),
        ]);
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.jwks_cache_ttl, Duration::from_secs(30));
        assert_eq!(config.prayed_window_hours, 24);
        assert_eq!(
            config.cors_allowed_origins,
            vec!["http://localhost:5173", "https://parish.app"]
        );
        assert_eq!(config.log_format, LogFormat::Json);
        // Unparsable values fall back to defaults
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_config_rate_limit_overrides() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend_from_slice(&[("RATE_LIMIT_REQUESTS", "30"), ("RATE_LIMIT_WINDOW", "2m")]);
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.rate_limit_requests, 30);
        assert_eq!(config.rate_limit_window, Duration::from_secs(120));

        let mut pairs = REQUIRED.to_vec();
        pairs.extend_from_slice(&[("RATE_LIMIT_REQUESTS", "0"), ("RATE_LIMIT_WINDOW", "soon")]);
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.rate_limit_requests, 120);
        assert_eq!(config.rate_limit_window, Duration::from_secs(60));
    }

    #[test]
    fn test_parse_window() {
        assert_eq!(parse_window("90"), Some(Duration::from_secs(90)));
        assert_eq!(parse_window("45s"), Some(Duration::from_secs(45)));
        assert_eq!(parse_window(" 15m "), Some(Duration::from_secs(900)));
        assert_eq!(parse_window("1h"), Some(Duration::from_secs(3600)));
        assert_eq!(parse_window("0s"), None);
        assert_eq!(parse_window("1d"), None);
        assert_eq!(parse_window("m"), None);
    }

    #[test]
    fn test_blank_cors_list_keeps_dev_origins() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("CORS_ALLOWED_ORIGINS", " , "));
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.cors_allowed_origins.len(), 4);
    }

    #[test]
    #[ignore] // Requires .env file with all config vars - run locally only
    fn test_config_from_env_loads_successfully() {
        let result = Config::from_env();
        assert!(
            result.is_ok(),
            "Config should load successfully in development environment: {}",
            result
                .err()
                .map_or("Unknown error".to_string(), |e| e.to_string())
        );
    }
}
