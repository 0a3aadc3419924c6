//! Concrete authentication backend
//!
//! Wraps `PgPool` + the shared `TokenValidator` and owns the auth-specific
//! SQL. Uses runtime `sqlx::query_as` (not macros) like the domain
//! repositories do for cross-domain reads.

use std::sync::Arc;

use parish_common::{is_unique_violation, is_valid_username, normalize_username};
use sqlx::PgPool;
use uuid::Uuid;

use crate::claims::VerifiedClaims;
use crate::context::AuthContext;
use crate::error::AuthError;
use crate::jwks::TokenValidator;
use crate::types::AuthIdentity;

const DISPLAY_NAME_MIN: usize = 2;
const DISPLAY_NAME_MAX: usize = 80;

/// Concrete authentication backend.
///
/// Domain states expose this via `FromRef`:
/// ```ignore
/// impl FromRef<MyDomainState> for AuthBackend {
///     fn from_ref(state: &MyDomainState) -> Self {
///         state.auth.clone()
///     }
/// }
/// ```
#[derive(Clone)]
pub struct AuthBackend {
    pool: PgPool,
    validator: Arc<TokenValidator>,
}

impl AuthBackend {
    pub fn new(pool: PgPool, validator: Arc<TokenValidator>) -> Self {
        Self { pool, validator }
    }

    pub fn validator(&self) -> &TokenValidator {
        &self.validator
    }

    /// Find user identity by ID
    pub(crate) async fn find_user(&self, id: Uuid) -> Result<Option<AuthIdentity>, AuthError> {
        let user: Option<AuthIdentity> = sqlx::query_as(
            r#"
            SELECT id, email, username, display_name, avatar_url,
                   created_at, updated_at
            FROM users
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = %id, "Failed to load user");
            AuthError::UserLoadError
        })?;

        Ok(user)
    }

    /// Provision a new user from verified claims (JIT user provisioning).
    ///
    /// Called on first authenticated request when the user doesn't exist in the DB.
    /// `ON CONFLICT (id) DO NOTHING` handles concurrent first requests; a
    /// username collision moves on to the next candidate.
    async fn provision_user(
        &self,
        user_id: Uuid,
        claims: &VerifiedClaims,
    ) -> Result<AuthIdentity, AuthError> {
        let email = provisioned_email(user_id, claims);

        for username in username_candidates(user_id, claims) {
            let display_name = provisioned_display_name(claims, &email, &username);

            let result = sqlx::query(
                r#"
                INSERT INTO users (id, email, username, display_name, avatar_url, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(user_id)
            .bind(&email)
            .bind(&username)
            .bind(&display_name)
            .bind(claims.avatar_url.as_deref())
            .execute(&self.pool)
            .await;

            match result {
                Ok(_) => {
                    tracing::info!(user_id = %user_id, username = %username, "JIT user provisioned");
                    return self.find_user(user_id).await?.ok_or_else(|| {
                        tracing::error!(user_id = %user_id, "User not found after provisioning");
                        AuthError::UserProvisionFailed
                    });
                }
                Err(e) if is_unique_violation(&e) => {
                    tracing::debug!(user_id = %user_id, username = %username, "Username taken, trying next candidate");
                }
                Err(e) => {
                    tracing::error!(error = %e, user_id = %user_id, "Failed to provision user");
                    return Err(AuthError::UserProvisionFailed);
                }
            }
        }

        tracing::error!(user_id = %user_id, "No free username for new user");
        Err(AuthError::UserProvisionFailed)
    }

    /// Validate the token and make sure the user row exists.
    pub(crate) async fn authenticate_jwt(&self, token: &str) -> Result<AuthContext, AuthError> {
        let claims = self.validator.validate(token).await?;

        let user_id = Uuid::parse_str(&claims.subject).map_err(|_| AuthError::InvalidUserId)?;

        let user = match self.find_user(user_id).await? {
            Some(user) => user,
            None => self.provision_user(user_id, &claims).await?,
        };

        Ok(AuthContext::new(user))
    }
}

fn provisioned_email(user_id: Uuid, claims: &VerifiedClaims) -> String {
    claims
        .email
        .clone()
        .unwrap_or_else(|| format!("{}@auth.local", user_id))
}

/// Claimed username first (when well formed), then id-derived fallbacks
fn username_candidates(user_id: Uuid, claims: &VerifiedClaims) -> Vec<String> {
    let simple = user_id.simple().to_string();
    let mut candidates: Vec<String> = claims
        .username
        .as_deref()
        .map(normalize_username)
        .filter(|u| is_valid_username(u))
        .into_iter()
        .collect();

    candidates.extend([8, 16, 25].iter().map(|len| format!("user_{}", &simple[..*len])));
    candidates
}

fn within_display_name_bounds(name: &str) -> bool {
    let len = name.chars().count();
    (DISPLAY_NAME_MIN..=DISPLAY_NAME_MAX).contains(&len)
}

/// Claimed display name, else the email local part, else the username
fn provisioned_display_name(claims: &VerifiedClaims, email: &str, username: &str) -> String {
    let local_part = email.split('@').next().unwrap_or("").trim();

    claims
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|name| within_display_name_bounds(name))
        .or(Some(local_part).filter(|name| within_display_name_bounds(name)))
        .unwrap_or(username)
        .to_string()
}
