//! Username normalization shared by provisioning and profile updates

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref USERNAME_RE: Regex =
        Regex::new(r"^[a-z0-9_]{3,30}$").expect("Invalid username regex");
}

/// Trim, lowercase and strip leading `@` signs
pub fn normalize_username(raw: &str) -> String {
    raw.trim().trim_start_matches('@').trim().to_lowercase()
}

/// Lowercase letters, digits and underscores, 3 to 30 characters
pub fn is_valid_username(username: &str) -> bool {
    USERNAME_RE.is_match(username)
}
