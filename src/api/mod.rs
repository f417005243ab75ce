mod access;
mod auth;
mod challans;
mod envelope;
mod suppliers;
mod users;

use axum::Router;
use std::sync::Arc;

use crate::db::Database;
use crate::jwt::JwtConfig;
use crate::rate_limit::RateLimitConfig;

pub use envelope::{ApiError, Envelope, FieldErrors, ResultExt};

/// Create the API router.
pub fn create_api_router(db: Database, jwt: Arc<JwtConfig>, secure_cookies: bool) -> Router {
    let auth_state = auth::AuthState {
        db: db.clone(),
        jwt: jwt.clone(),
        secure_cookies,
        rate_limit: Arc::new(RateLimitConfig::new()),
    };

    let access_state = access::AccessState { jwt: jwt.clone() };

    let challans_state = challans::ChallansState {
        db: db.clone(),
        jwt: jwt.clone(),
    };

    let suppliers_state = suppliers::SuppliersState {
        db: db.clone(),
        jwt: jwt.clone(),
    };

    let users_state = users::UsersState { db, jwt };

    let v1 = access::router(access_state)
        .nest("/delivery-challans", challans::router(challans_state));

    Router::new()
        .nest("/auth", auth::router(auth_state))
        .nest("/v1", v1)
        .nest("/suppliers", suppliers::router(suppliers_state))
        .nest("/users", users::router(users_state))
}
