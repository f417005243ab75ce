#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use dcdesk::{ServerConfig, create_app, db::Database};
use tower::ServiceExt;

pub const TEST_JWT_SECRET: &[u8] = b"test-jwt-secret-with-enough-length";

/// Build an app over a fresh in-memory database.
pub async fn test_app() -> (Router, Database) {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");
    let config = ServerConfig {
        db: db.clone(),
        jwt_secret: TEST_JWT_SECRET.to_vec(),
        secure_cookies: false,
    };
    (create_app(&config), db)
}

/// Send a request and return the raw response.
/// `token` is sent as the access-token cookie.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
    token: Option<&str>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("access_token={token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

/// Send a request and parse the envelope body.
pub async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
    token: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    let response = send(app, method, uri, body, token).await;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

/// All Set-Cookie header values on a response.
pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

/// Create the first super admin through the setup endpoint.
pub async fn setup_super_admin(app: &Router) {
    let (status, _) = request(
        app,
        "POST",
        "/api/auth/setup",
        Some(serde_json::json!({
            "userId": "root",
            "email": "root@example.com",
            "name": "Root Admin",
            "password": "root-password",
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

/// Log in and return the access token from the response data.
pub async fn login(app: &Router, user_id: &str, password: &str) -> String {
    let (status, json) = request(
        app,
        "POST",
        "/api/auth/login",
        Some(serde_json::json!({ "userId": user_id, "password": password })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {json}");
    json["data"]["accessToken"].as_str().unwrap().to_string()
}

/// Create a user through the create-user endpoint using the given token.
pub async fn create_user(app: &Router, token: &str, user_id: &str, role: &str) {
    let (status, json) = request(
        app,
        "POST",
        "/api/auth/create-user",
        Some(serde_json::json!({
            "userId": user_id,
            "email": format!("{user_id}@example.com"),
            "name": format!("Test {user_id}"),
            "password": format!("{user_id}-password"),
            "role": role,
        })),
        Some(token),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create_user failed: {json}");
}

/// Seed a super admin, create one admin and one plain user, and return
/// access tokens as (user, admin, super_admin).
pub async fn seed_all_roles(app: &Router) -> (String, String, String) {
    setup_super_admin(app).await;
    let root = login(app, "root", "root-password").await;
    create_user(app, &root, "adminuser", "admin").await;
    create_user(app, &root, "plainuser", "user").await;
    let admin = login(app, "adminuser", "adminuser-password").await;
    let user = login(app, "plainuser", "plainuser-password").await;
    (user, admin, root)
}
