//! Verified token claims and identity extraction

use serde_json::{Map, Value};

use crate::error::AuthError;

/// Where an identity attribute may live inside the claim set.
#[derive(Debug, Clone, Copy)]
enum ClaimSource {
    TopLevel,
    Nested(&'static str),
}

/// Sources are tried in order; the first non-empty string wins.
const SOURCES: [ClaimSource; 3] = [
    ClaimSource::TopLevel,
    ClaimSource::Nested("user_metadata"),
    ClaimSource::Nested("app_metadata"),
];

const USERNAME_KEYS: &[&str] = &["username", "user_name", "preferred_username"];
const DISPLAY_NAME_KEYS: &[&str] = &["display_name", "full_name", "name"];
const AVATAR_KEYS: &[&str] = &["avatar_url", "picture"];

impl ClaimSource {
    fn object<'a>(&self, claims: &'a Map<String, Value>) -> Option<&'a Map<String, Value>> {
        match self {
            ClaimSource::TopLevel => Some(claims),
            ClaimSource::Nested(key) => claims.get(*key).and_then(Value::as_object),
        }
    }
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// First non-empty string for any of `keys`, walking the sources in order
fn lookup(claims: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    SOURCES
        .iter()
        .filter_map(|source| source.object(claims))
        .flat_map(|object| keys.iter().map(move |key| object.get(*key)))
        .find_map(non_empty_string)
}

/// Identity claims from a token whose signature and issuer were verified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedClaims {
    /// Subject (user ID)
    pub subject: String,
    pub email: Option<String>,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl VerifiedClaims {
    pub(crate) fn from_claims(claims: &Map<String, Value>) -> Result<Self, AuthError> {
        let subject = non_empty_string(claims.get("sub")).ok_or(AuthError::MissingSubject)?;

        Ok(Self {
            subject,
            email: non_empty_string(claims.get("email")),
            username: lookup(claims, USERNAME_KEYS),
            display_name: lookup(claims, DISPLAY_NAME_KEYS),
            avatar_url: lookup(claims, AVATAR_KEYS),
        })
    }
}
