//! Feed scopes

use serde::Deserialize;

/// Which slice of visible prayer requests a feed returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedScope {
    /// Public active requests, anonymous callers allowed
    Public,
    /// Requests attached to groups the viewer is an active member of
    Groups,
    /// Public active requests by accepted friends
    Friends,
    /// Own requests plus friends and groups, deduplicated
    Home,
}

impl FeedScope {
    /// Scopes other than `Public` are computed relative to a viewer
    pub fn requires_viewer(&self) -> bool {
        !matches!(self, FeedScope::Public)
    }
}

impl std::fmt::Display for FeedScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedScope::Public => write!(f, "public"),
            FeedScope::Groups => write!(f, "groups"),
            FeedScope::Friends => write!(f, "friends"),
            FeedScope::Home => write!(f, "home"),
        }
    }
}
