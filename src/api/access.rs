//! Gated example endpoints demonstrating each role constraint.
//!
//! These are the reference consumers of the authorization gate: one endpoint
//! per allow-list shape, each returning the caller's verified claims.

use axum::{Router, response::IntoResponse, routing::get};
use serde_json::json;
use std::sync::Arc;

use super::envelope::Envelope;
use crate::auth::{AdminOnly, AnyRole, Auth, SuperAdminOnly};
use crate::impl_has_auth_backend;
use crate::jwt::JwtConfig;

#[derive(Clone)]
pub struct AccessState {
    pub jwt: Arc<JwtConfig>,
}

impl_has_auth_backend!(AccessState);

pub fn router(state: AccessState) -> Router {
    Router::new()
        .route("/protected", get(protected))
        .route("/admin-only", get(admin_only))
        .route("/super-admin-only", get(super_admin_only))
        .with_state(state)
}

/// Requires any authenticated user.
async fn protected(auth: Auth<AnyRole>) -> impl IntoResponse {
    Envelope::ok(
        "This is a protected endpoint",
        json!({ "user": auth.claims }),
    )
}

/// Requires admin or super_admin role.
async fn admin_only(auth: Auth<AdminOnly>) -> impl IntoResponse {
    Envelope::ok(
        "This endpoint is admin-only",
        json!({ "user": auth.claims }),
    )
}

/// Requires super_admin role.
async fn super_admin_only(auth: Auth<SuperAdminOnly>) -> impl IntoResponse {
    Envelope::ok(
        "This endpoint is super_admin-only",
        json!({ "user": auth.claims }),
    )
}
