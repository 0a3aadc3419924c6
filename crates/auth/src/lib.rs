//! Authentication for the Parish API
//!
//! Provides JWKS-backed token validation, just-in-time user provisioning,
//! and axum extractors that work with any domain state implementing
//! `FromRef<S>` for `AuthBackend`.

mod backend;
mod claims;
mod config;
mod context;
mod error;
mod extractors;
mod jwks;
mod jwt;
mod types;

pub use backend::AuthBackend;
pub use claims::VerifiedClaims;
pub use config::AuthConfig;
pub use context::AuthContext;
pub use error::AuthError;
pub use extractors::{AuthUser, MaybeAuthUser};
pub use jwks::TokenValidator;
pub use types::AuthIdentity;
