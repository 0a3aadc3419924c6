//! JWKS-backed token validation
//!
//! Fetches the issuer's JSON Web Key Set, caches it for a fixed TTL and
//! verifies bearer tokens against it. The cached key set is replaced as a
//! whole on every successful refresh; a failed refresh leaves the cache
//! untouched and never falls back to expired keys.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::claims::VerifiedClaims;
use crate::config::AuthConfig;
use crate::error::AuthError;

/// Upper bound on the cache TTL
const MAX_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Key family a JWK belongs to; decides which algorithms it may verify
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyFamily {
    Rsa,
    EcP256,
    EcP384,
}

impl KeyFamily {
    fn accepts(&self, alg: Algorithm) -> bool {
        match self {
            KeyFamily::Rsa => matches!(
                alg,
                Algorithm::RS256
                    | Algorithm::RS384
                    | Algorithm::RS512
                    | Algorithm::PS256
                    | Algorithm::PS384
                    | Algorithm::PS512
            ),
            KeyFamily::EcP256 => alg == Algorithm::ES256,
            KeyFamily::EcP384 => alg == Algorithm::ES384,
        }
    }
}

fn is_supported_algorithm(alg: Algorithm) -> bool {
    matches!(
        alg,
        Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512
            | Algorithm::ES256
            | Algorithm::ES384
    )
}

#[derive(Clone)]
struct CachedKey {
    family: KeyFamily,
    decoding: DecodingKey,
}

type KeySet = HashMap<String, CachedKey>;

#[derive(Default)]
struct KeyCache {
    keys: Arc<KeySet>,
    /// `None` until the first successful fetch
    expires_at: Option<Instant>,
}

impl KeyCache {
    fn fresh_keys(&self) -> Option<Arc<KeySet>> {
        match self.expires_at {
            Some(expires_at) if Instant::now() < expires_at => Some(self.keys.clone()),
            _ => None,
        }
    }
}

/// Wire shape of a single JWK. Unknown members are ignored.
#[derive(Debug, Deserialize)]
struct RawJwk {
    kty: String,
    #[serde(default)]
    kid: Option<String>,
    #[serde(default, rename = "use")]
    key_use: Option<String>,
    #[serde(default)]
    n: Option<String>,
    #[serde(default)]
    e: Option<String>,
    #[serde(default)]
    crv: Option<String>,
    #[serde(default)]
    x: Option<String>,
    #[serde(default)]
    y: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JwksDocument {
    #[serde(default)]
    keys: Vec<Value>,
}

impl RawJwk {
    /// Convert to a verification key; `None` for anything unusable
    fn into_cached(self) -> Option<(String, CachedKey)> {
        let kid = self.kid.filter(|k| !k.is_empty())?;
        if self.key_use.as_deref() == Some("enc") {
            return None;
        }

        let cached = match self.kty.as_str() {
            "RSA" => {
                let (n, e) = (self.n?, self.e?);
                CachedKey {
                    family: KeyFamily::Rsa,
                    decoding: DecodingKey::from_rsa_components(&n, &e).ok()?,
                }
            }
            "EC" => {
                let family = match self.crv.as_deref() {
                    Some("P-256") => KeyFamily::EcP256,
                    Some("P-384") => KeyFamily::EcP384,
                    _ => return None,
                };
                let (x, y) = (self.x?, self.y?);
                CachedKey {
                    family,
                    decoding: DecodingKey::from_ec_components(&x, &y).ok()?,
                }
            }
            _ => return None,
        };

        Some((kid, cached))
    }
}

fn parse_key_set(document: JwksDocument) -> KeySet {
    document
        .keys
        .into_iter()
        .filter_map(|value| serde_json::from_value::<RawJwk>(value).ok())
        .filter_map(RawJwk::into_cached)
        .collect()
}

/// Trim surrounding whitespace and trailing slashes
fn normalize_issuer(issuer: &str) -> &str {
    issuer.trim().trim_end_matches('/')
}

fn issuers_match(expected: &str, actual: &str) -> bool {
    let expected = normalize_issuer(expected);
    !expected.is_empty() && expected == normalize_issuer(actual)
}

/// Verifies bearer tokens against a cached remote key set.
///
/// One instance is shared by every request through an `Arc`.
pub struct TokenValidator {
    issuer: String,
    jwks_url: String,
    cache_ttl: Duration,
    client: reqwest::Client,
    cache: RwLock<KeyCache>,
}

impl fmt::Debug for TokenValidator {
    #[mutants::skip]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenValidator")
            .field("issuer", &self.issuer)
            .field("jwks_url", &self.jwks_url)
            .field("cache_ttl", &self.cache_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenValidator {
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| AuthError::JwksFetch(format!("failed to build http client: {}", e)))?;

        Ok(Self {
            issuer: config.issuer.clone(),
            jwks_url: config.jwks_url.clone(),
            cache_ttl: config.cache_ttl.min(MAX_CACHE_TTL),
            client,
            cache: RwLock::new(KeyCache::default()),
        })
    }

    /// Verify a compact JWS and extract the caller's identity claims.
    ///
    /// `exp` is mandatory: a token without it is rejected even though plain
    /// JWT parsing elsewhere would accept it as non-expiring.
    pub async fn validate(&self, token: &str) -> Result<VerifiedClaims, AuthError> {
        let header = decode_header(token).map_err(|e| {
            tracing::debug!(error = %e, "Token header could not be parsed");
            AuthError::MalformedToken
        })?;

        if !is_supported_algorithm(header.alg) {
            return Err(AuthError::UnsupportedAlgorithm(header.alg));
        }

        let key = match header.kid.as_deref().filter(|kid| !kid.is_empty()) {
            Some(kid) => self.key_by_id(kid).await?,
            None => self.sole_key().await?,
        };

        if !key.family.accepts(header.alg) {
            tracing::debug!(alg = ?header.alg, family = ?key.family, "Key type does not match token algorithm");
            return Err(AuthError::InvalidToken);
        }

        let mut validation = Validation::new(header.alg);
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        let data = decode::<Map<String, Value>>(token, &key.decoding, &validation).map_err(|e| {
            tracing::debug!(error = %e, "JWT validation failed");
            AuthError::InvalidToken
        })?;

        let issuer = data.claims.get("iss").and_then(Value::as_str).unwrap_or("");
        if !issuers_match(&self.issuer, issuer) {
            tracing::debug!(issuer = %issuer, "Token issuer mismatch");
            return Err(AuthError::IssuerMismatch);
        }

        VerifiedClaims::from_claims(&data.claims)
    }

    /// Fetch the key set and replace the cache wholesale.
    pub async fn refresh(&self) -> Result<(), AuthError> {
        self.fetch_and_store().await.map(|_| ())
    }

    /// Returns the freshly fetched set so callers can resolve against it
    /// even when the TTL is zero.
    async fn fetch_and_store(&self) -> Result<Arc<KeySet>, AuthError> {
        tracing::debug!(jwks_url = %self.jwks_url, "Fetching JWKS");

        let response = self.client.get(&self.jwks_url).send().await.map_err(|e| {
            tracing::warn!(error = %e, jwks_url = %self.jwks_url, "JWKS request failed");
            AuthError::JwksFetch(format!("request failed: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, jwks_url = %self.jwks_url, "JWKS endpoint returned an error");
            return Err(AuthError::JwksFetch(format!("unexpected status {}", status)));
        }

        let document: JwksDocument = response.json().await.map_err(|e| {
            tracing::warn!(error = %e, "JWKS body could not be parsed");
            AuthError::JwksFetch(format!("invalid body: {}", e))
        })?;

        let keys = parse_key_set(document);
        if keys.is_empty() {
            return Err(AuthError::JwksFetch("no usable keys".to_string()));
        }

        let keys = Arc::new(keys);
        {
            let mut cache = self.cache.write().await;
            cache.keys = keys.clone();
            cache.expires_at = Some(Instant::now() + self.cache_ttl);
        }

        tracing::info!(key_count = keys.len(), "JWKS refreshed");
        Ok(keys)
    }

    async fn fresh_keys(&self) -> Option<Arc<KeySet>> {
        self.cache.read().await.fresh_keys()
    }

    async fn key_by_id(&self, kid: &str) -> Result<CachedKey, AuthError> {
        if let Some(key) = self
            .fresh_keys()
            .await
            .and_then(|keys| keys.get(kid).cloned())
        {
            return Ok(key);
        }

        let keys = self.fetch_and_store().await?;
        keys.get(kid)
            .cloned()
            .ok_or_else(|| AuthError::KeyNotFound(kid.to_string()))
    }

    /// Tokens without a key id are only accepted against a single-key set.
    async fn sole_key(&self) -> Result<CachedKey, AuthError> {
        if let Some(key) = self.fresh_keys().await.and_then(|keys| single(&keys)) {
            return Ok(key);
        }

        let keys = self.fetch_and_store().await?;
        single(&keys).ok_or(AuthError::AmbiguousKey)
    }
}

fn single(keys: &KeySet) -> Option<CachedKey> {
    if keys.len() == 1 {
        keys.values().next().cloned()
    } else {
        None
    }
}
