//! Authentication error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::jwt::JwtError;

/// Why a request failed the authorization gate.
///
/// The first four kinds are "unauthenticated" (401); `InsufficientRole` is
/// "forbidden" (403) and carries the denying constraint's message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// No credential in the cookie store or Authorization header
    MissingCredential,
    /// Signature does not verify
    InvalidSignature,
    /// Token expiry is in the past
    Expired,
    /// Token is structurally invalid or carries an unknown field value
    Malformed,
    /// Authenticated, but the role is not in the endpoint's allow-list
    InsufficientRole(&'static str),
}

impl AuthError {
    /// Map a token decoding failure onto the gate's taxonomy.
    pub fn from_jwt(e: JwtError) -> Self {
        match e {
            JwtError::Expired => AuthError::Expired,
            JwtError::InvalidSignature => AuthError::InvalidSignature,
            // Encoding/time errors cannot occur during validation; a
            // wrong-typed token is malformed from the gate's perspective.
            _ => AuthError::Malformed,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCredential
            | AuthError::InvalidSignature
            | AuthError::Expired
            | AuthError::Malformed => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientRole(_) => StatusCode::FORBIDDEN,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => "Unauthorized",
            AuthError::InvalidSignature | AuthError::Expired | AuthError::Malformed => {
                "Invalid or expired token"
            }
            AuthError::InsufficientRole(message) => message,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorEnvelope {
            success: bool,
            message: &'static str,
        }

        (
            self.status_code(),
            Json(ErrorEnvelope {
                success: false,
                message: self.message(),
            }),
        )
            .into_response()
    }
}
