//! Validation helpers and constants for community inputs

pub const GROUP_NAME_MIN_CHARS: usize = 3;
pub const GROUP_NAME_MAX_CHARS: usize = 80;
pub const GROUP_DESCRIPTION_MAX_CHARS: usize = 500;
pub const DISPLAY_NAME_MIN_CHARS: usize = 2;
pub const DISPLAY_NAME_MAX_CHARS: usize = 80;

/// Friend requests need at least this many characters after normalization
pub const FRIEND_USERNAME_MIN_CHARS: usize = 3;

const SEARCH_DEFAULT_LIMIT: i64 = 20;
const SEARCH_MAX_LIMIT: i64 = 30;

pub fn is_valid_group_name(name: &str) -> bool {
    (GROUP_NAME_MIN_CHARS..=GROUP_NAME_MAX_CHARS).contains(&name.chars().count())
}

pub fn is_valid_group_description(description: &str) -> bool {
    description.chars().count() <= GROUP_DESCRIPTION_MAX_CHARS
}

pub fn is_valid_display_name(display_name: &str) -> bool {
    (DISPLAY_NAME_MIN_CHARS..=DISPLAY_NAME_MAX_CHARS).contains(&display_name.chars().count())
}

/// Absent or non-positive means 20; anything above 30 is clamped
pub fn search_limit(limit: Option<i64>) -> i64 {
    match limit {
        Some(limit) if limit > 0 => limit.min(SEARCH_MAX_LIMIT),
        _ => SEARCH_DEFAULT_LIMIT,
    }
}

/// Escape `LIKE` metacharacters so user input only ever matches literally
pub fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
