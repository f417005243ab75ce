//! User listing API for the admin dashboard.

use axum::{Router, extract::State, response::IntoResponse, routing::get};
use serde_json::json;
use std::sync::Arc;

use super::envelope::{ApiError, Envelope, ResultExt};
use crate::auth::{AdminOnly, Auth};
use crate::db::Database;
use crate::impl_has_auth_backend;
use crate::jwt::JwtConfig;

#[derive(Clone)]
pub struct UsersState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
}

impl_has_auth_backend!(UsersState);

pub fn router(state: UsersState) -> Router {
    Router::new().route("/", get(list_users)).with_state(state)
}

/// List all users. Password hashes and row IDs are never included.
async fn list_users(
    State(state): State<UsersState>,
    _auth: Auth<AdminOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let users = state.db.users().list().await.db_err("Failed to list users")?;

    Ok(Envelope::ok(
        "Users retrieved successfully",
        json!({ "users": users }),
    ))
}
