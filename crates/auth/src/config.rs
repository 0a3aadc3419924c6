//! Authentication configuration

use std::time::Duration;

/// Default lifetime of a fetched key set
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(600);

/// Default timeout for a JWKS round trip
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub issuer: String,
    pub jwks_url: String,
    pub cache_ttl: Duration,
    pub http_timeout: Duration,
}

impl AuthConfig {
    pub fn new(issuer: impl Into<String>, jwks_url: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            jwks_url: jwks_url.into(),
            cache_ttl: DEFAULT_CACHE_TTL,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }

    pub fn with_cache_ttl(mut self, cache_ttl: Duration) -> Self {
        self.cache_ttl = cache_ttl;
        self
    }

    pub fn with_http_timeout(mut self, http_timeout: Duration) -> Self {
        self.http_timeout = http_timeout;
        self
    }
}

impl From<&parish_common::Config> for AuthConfig {
    fn from(config: &parish_common::Config) -> Self {
        Self {
            issuer: config.jwt_issuer.clone(),
            jwks_url: config.jwks_url.clone(),
            cache_ttl: config.jwks_cache_ttl,
            http_timeout: config.jwks_http_timeout,
        }
    }
}
