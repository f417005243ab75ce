//! The authorization gate and its axum extractors.

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use super::cookie::access_credential;
use super::errors::AuthError;
use super::policy::{AnyRole, RoleConstraint, is_allowed};
use super::state::HasAuthBackend;
use crate::db::UserRole;
use crate::jwt::SessionClaims;

/// Run the authorization gate for a request.
///
/// Extracts the credential from the request's headers, verifies it against
/// the process secret, and checks the claim's role against the allow-list
/// when `allowed` is non-empty. Verification happens from scratch on every
/// call; there is no session store and nothing is cached, so two concurrent
/// requests with the same token resolve identically and independently.
pub fn authorize<S>(
    parts: &Parts,
    state: &S,
    allowed: &'static [UserRole],
    denial: &'static str,
) -> Result<SessionClaims, AuthError>
where
    S: HasAuthBackend,
{
    let token = access_credential(&parts.headers).ok_or(AuthError::MissingCredential)?;

    let claims = state
        .jwt()
        .validate_access_token(token)
        .map_err(AuthError::from_jwt)?;

    if !allowed.is_empty() && !is_allowed(claims.role, allowed) {
        return Err(AuthError::InsufficientRole(denial));
    }

    Ok(claims)
}

/// Extractor that gates a handler behind authentication and a role
/// constraint. Runs before the handler body; on failure the request
/// terminates with the envelope response for the failure kind.
///
/// ```ignore
/// async fn list_users(auth: Auth<AdminOnly>, ...) { ... }
/// ```
pub struct Auth<C: RoleConstraint = AnyRole> {
    /// Verified claims for the authenticated caller.
    pub claims: SessionClaims,
    _constraint: PhantomData<C>,
}

impl<S, C> FromRequestParts<S> for Auth<C>
where
    S: HasAuthBackend + Send + Sync,
    C: RoleConstraint,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let claims = authorize(parts, state, C::ALLOWED, C::DENIAL)?;
        Ok(Auth {
            claims,
            _constraint: PhantomData,
        })
    }
}
