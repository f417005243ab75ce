//! Supplier listing API.

use axum::{Router, extract::State, response::IntoResponse, routing::get};
use serde_json::json;
use std::sync::Arc;

use super::envelope::{ApiError, Envelope, ResultExt};
use crate::auth::{AnyRole, Auth};
use crate::db::Database;
use crate::impl_has_auth_backend;
use crate::jwt::JwtConfig;

#[derive(Clone)]
pub struct SuppliersState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
}

impl_has_auth_backend!(SuppliersState);

pub fn router(state: SuppliersState) -> Router {
    Router::new().route("/", get(list_suppliers)).with_state(state)
}

/// List all supplier parties.
async fn list_suppliers(
    State(state): State<SuppliersState>,
    _auth: Auth<AnyRole>,
) -> Result<impl IntoResponse, ApiError> {
    let suppliers = state
        .db
        .parties()
        .list()
        .await
        .db_err("Failed to fetch suppliers")?;

    let message = if suppliers.is_empty() {
        "No suppliers found"
    } else {
        "Suppliers found"
    };

    Ok(Envelope::ok(message, json!({ "suppliers": suppliers })))
}
