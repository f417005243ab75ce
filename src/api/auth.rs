//! Authentication API endpoints.
//!
//! - POST `/login` - Verify credentials, issue token pair, set cookies
//! - POST `/logout` - Clear both auth cookies (unconditional, idempotent)
//! - POST `/refresh` - Exchange a refresh token for a rotated pair
//! - POST `/verify-user` - Check whether a login identifier exists
//! - POST `/setup` - Seed the first super admin on a fresh install
//! - POST `/create-user` - Create an account (admin or super admin only)

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    middleware,
    response::{AppendHeaders, IntoResponse},
    routing::post,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::error;

use super::envelope::{
    ApiError, Envelope, FieldErrors, ResultExt, is_valid_email, push_field_error,
};
use crate::auth::{ACCESS_COOKIE_NAME, AdminOnly, Auth, REFRESH_COOKIE_NAME, get_cookie};
use crate::db::{Database, NewUser, User, UserRole};
use crate::impl_has_auth_backend;
use crate::jwt::JwtConfig;
use crate::password::{hash_password, verify_password};
use crate::rate_limit::{RateLimitConfig, rate_limit_login};

#[derive(Clone)]
pub struct AuthState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
    pub secure_cookies: bool,
    pub rate_limit: Arc<RateLimitConfig>,
}

impl_has_auth_backend!(AuthState);

pub fn router(state: AuthState) -> Router {
    let login_router = Router::new()
        .route("/login", post(login))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(
            state.rate_limit.clone(),
            rate_limit_login,
        ));

    Router::new()
        .route("/logout", post(logout))
        .route("/refresh", post(refresh))
        .route("/verify-user", post(verify_user))
        .route("/setup", post(setup))
        .route("/create-user", post(create_user))
        .with_state(state)
        .merge(login_router)
}

// --- Request/Response types ---

#[derive(Deserialize)]
struct LoginRequest {
    #[serde(rename = "userId")]
    user_id: Option<String>,
    password: Option<String>,
}

#[derive(Deserialize)]
struct RefreshRequest {
    #[serde(rename = "refreshToken")]
    refresh_token: Option<String>,
}

#[derive(Deserialize)]
struct VerifyUserRequest {
    #[serde(rename = "userId")]
    user_id: Option<String>,
}

#[derive(Deserialize)]
struct CreateUserRequest {
    #[serde(rename = "userId")]
    user_id: Option<String>,
    email: Option<String>,
    name: Option<String>,
    password: Option<String>,
    role: Option<String>,
}

/// Public view of a user, returned from login and account creation.
/// Exposes the UUID as `id`; password hashes and row IDs stay internal.
#[derive(Serialize)]
struct UserData {
    id: String,
    #[serde(rename = "userId")]
    user_id: String,
    name: String,
    email: String,
    role: UserRole,
}

impl From<&User> for UserData {
    fn from(user: &User) -> Self {
        Self {
            id: user.uuid.clone(),
            user_id: user.user_id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

// --- Helpers ---

fn auth_cookie(name: &str, value: &str, max_age: u64, secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!("{name}={value}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age}{secure}")
}

fn clear_cookie(name: &str, secure: bool) -> String {
    auth_cookie(name, "", 0, secure)
}

fn token_err(e: crate::jwt::JwtError) -> ApiError {
    error!("Failed to generate token: {}", e);
    ApiError::internal("Failed to generate token")
}

/// Validated fields for a new account.
struct ValidNewUser {
    user_id: String,
    email: String,
    name: String,
    password: String,
    role: UserRole,
}

/// Field validation shared by setup and create-user. Missing fields are
/// treated as empty so the length messages apply uniformly.
fn validate_new_user(req: &CreateUserRequest, default_role: UserRole) -> Result<ValidNewUser, ApiError> {
    let user_id = req.user_id.as_deref().unwrap_or("").trim().to_string();
    let email = req.email.as_deref().unwrap_or("").trim().to_string();
    let name = req.name.as_deref().unwrap_or("").trim().to_string();
    let password = req.password.as_deref().unwrap_or("").to_string();

    let mut errors = FieldErrors::new();

    if user_id.chars().count() < 3 {
        push_field_error(&mut errors, "userId", "User ID must be at least 3 characters");
    }
    if !is_valid_email(&email) {
        push_field_error(&mut errors, "email", "Invalid email format");
    }
    if name.chars().count() < 2 {
        push_field_error(&mut errors, "name", "Name must be at least 2 characters");
    }
    if password.chars().count() < 6 {
        push_field_error(&mut errors, "password", "Password must be at least 6 characters");
    }

    let role = match req.role.as_deref() {
        None | Some("") => Some(default_role),
        Some(value) => UserRole::parse(value),
    };
    if role.is_none() {
        push_field_error(
            &mut errors,
            "role",
            "Role must be one of user, admin, super_admin",
        );
    }

    if !errors.is_empty() {
        return Err(ApiError::validation("Validation failed", errors));
    }

    Ok(ValidNewUser {
        user_id,
        email,
        name,
        password,
        // Checked non-None above.
        role: role.unwrap_or(default_role),
    })
}

// --- Handlers ---

/// Verify credentials and issue a token pair.
async fn login(
    State(state): State<AuthState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = payload.user_id.as_deref().unwrap_or("").trim();
    let password = payload.password.as_deref().unwrap_or("");

    if user_id.is_empty() || password.is_empty() {
        return Err(ApiError::bad_request("User ID and password are required"));
    }

    let user = state
        .db
        .users()
        .get_by_user_id(user_id)
        .await
        .db_err("Failed to look up user")?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    if !verify_password(password, &user.password_hash) {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    if !user.is_active {
        return Err(ApiError::unauthorized("User account is inactive"));
    }

    let access = state.jwt.generate_access_token(&user).map_err(token_err)?;
    let refresh = state.jwt.generate_refresh_token(&user).map_err(token_err)?;

    let access_cookie = auth_cookie(
        ACCESS_COOKIE_NAME,
        &access.token,
        access.duration,
        state.secure_cookies,
    );
    let refresh_cookie = auth_cookie(
        REFRESH_COOKIE_NAME,
        &refresh.token,
        refresh.duration,
        state.secure_cookies,
    );

    Ok((
        AppendHeaders([(SET_COOKIE, access_cookie), (SET_COOKIE, refresh_cookie)]),
        Envelope::ok(
            "Login successful",
            json!({
                "user": UserData::from(&user),
                "accessToken": access.token,
                "refreshToken": refresh.token,
                "expiresIn": access.duration,
            }),
        ),
    ))
}

/// Clear both auth cookies. Succeeds regardless of prior auth state.
async fn logout(State(state): State<AuthState>) -> impl IntoResponse {
    let clear_access = clear_cookie(ACCESS_COOKIE_NAME, state.secure_cookies);
    let clear_refresh = clear_cookie(REFRESH_COOKIE_NAME, state.secure_cookies);

    (
        AppendHeaders([(SET_COOKIE, clear_access), (SET_COOKIE, clear_refresh)]),
        Envelope::message("Logged out successfully"),
    )
}

/// Exchange a refresh token for a rotated token pair.
/// The token comes from the request body or the refresh cookie.
async fn refresh(
    State(state): State<AuthState>,
    headers: HeaderMap,
    Json(payload): Json<RefreshRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let refresh_token = payload
        .refresh_token
        .as_deref()
        .filter(|t| !t.is_empty())
        .or_else(|| get_cookie(&headers, REFRESH_COOKIE_NAME))
        .ok_or_else(|| ApiError::bad_request("Refresh token is required"))?;

    let claims = state
        .jwt
        .validate_refresh_token(refresh_token)
        .map_err(|_| ApiError::unauthorized("Invalid or expired refresh token"))?;

    // The token outlives the account state it was minted from; re-check.
    let user = state
        .db
        .users()
        .get_by_uuid(&claims.sub)
        .await
        .db_err("Failed to look up user")?
        .ok_or_else(|| ApiError::unauthorized("User not found"))?;

    if !user.is_active {
        return Err(ApiError::forbidden("User account is inactive"));
    }

    let access = state.jwt.generate_access_token(&user).map_err(token_err)?;
    let new_refresh = state.jwt.generate_refresh_token(&user).map_err(token_err)?;

    let access_cookie = auth_cookie(
        ACCESS_COOKIE_NAME,
        &access.token,
        access.duration,
        state.secure_cookies,
    );
    let refresh_cookie = auth_cookie(
        REFRESH_COOKIE_NAME,
        &new_refresh.token,
        new_refresh.duration,
        state.secure_cookies,
    );

    Ok((
        AppendHeaders([(SET_COOKIE, access_cookie), (SET_COOKIE, refresh_cookie)]),
        Envelope::ok(
            "Token refreshed successfully",
            json!({
                "accessToken": access.token,
                "refreshToken": new_refresh.token,
                "expiresIn": access.duration,
            }),
        ),
    ))
}

/// Check whether a login identifier exists. A peer capability with no
/// authorization requirement.
async fn verify_user(
    State(state): State<AuthState>,
    Json(payload): Json<VerifyUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = payload.user_id.as_deref().unwrap_or("").trim();
    if user_id.is_empty() {
        return Err(ApiError::bad_request("User ID is required"));
    }

    let exists = state
        .db
        .users()
        .get_by_user_id(user_id)
        .await
        .map_err(|e| {
            error!("Failed to verify user ID: {}", e);
            ApiError::internal("Server error")
        })?
        .is_some();

    let message = if exists { "User found" } else { "User ID not found" };

    Ok(Json(Envelope {
        success: exists,
        message: message.to_string(),
        data: Some(json!({ "exists": exists })),
        errors: None,
    }))
}

/// Seed the first super admin. Refused once any user exists.
async fn setup(
    State(state): State<AuthState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let count = state.db.users().count().await.db_err("Failed to count users")?;
    if count > 0 {
        return Err(ApiError::forbidden(
            "Users already exist. Use /api/auth/create-user endpoint instead.",
        ));
    }

    // The seed account is always a super admin; any supplied role is ignored.
    let valid = validate_new_user(
        &CreateUserRequest {
            role: None,
            ..payload
        },
        UserRole::SuperAdmin,
    )?;

    let user = insert_user(&state.db, valid).await?;

    Ok((
        StatusCode::CREATED,
        Envelope::ok(
            "Super admin created successfully",
            json!({ "user": UserData::from(&user) }),
        ),
    ))
}

/// Create an account. Admins may only create `user`-role accounts; super
/// admins may create any role.
async fn create_user(
    State(state): State<AuthState>,
    auth: Auth<AdminOnly>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let valid = validate_new_user(&payload, UserRole::User)?;

    if auth.claims.role == UserRole::Admin && valid.role != UserRole::User {
        return Err(ApiError::forbidden(
            "Admins can only create users with 'user' role",
        ));
    }

    if state
        .db
        .users()
        .get_by_user_id(&valid.user_id)
        .await
        .db_err("Failed to check user ID")?
        .is_some()
    {
        return Err(ApiError::conflict("User ID already exists"));
    }

    if state
        .db
        .users()
        .get_by_email(&valid.email)
        .await
        .db_err("Failed to check email")?
        .is_some()
    {
        return Err(ApiError::conflict("Email already exists"));
    }

    let user = insert_user(&state.db, valid).await?;

    Ok((
        StatusCode::CREATED,
        Envelope::ok(
            "User created successfully",
            json!({ "user": UserData::from(&user) }),
        ),
    ))
}

/// Hash the password and insert the account, returning the stored user.
async fn insert_user(db: &Database, valid: ValidNewUser) -> Result<User, ApiError> {
    let password_hash = hash_password(&valid.password).map_err(|e| {
        error!("Failed to hash password: {}", e);
        ApiError::internal("Failed to create user")
    })?;
    let uuid = uuid::Uuid::new_v4().to_string();

    db.users()
        .create(NewUser {
            uuid: &uuid,
            user_id: &valid.user_id,
            email: &valid.email,
            name: &valid.name,
            password_hash: &password_hash,
            role: valid.role,
        })
        .await
        .db_err("Failed to create user")?;

    db.users()
        .get_by_uuid(&uuid)
        .await
        .db_err("Failed to load created user")?
        .ok_or_else(|| ApiError::internal("Failed to create user"))
}
