mod common;

use axum::http::StatusCode;
use common::{TEST_JWT_SECRET, login, request, seed_all_roles, setup_super_admin, test_app};
use dcdesk::db::UserRole;
use dcdesk::jwt::{SessionClaims, TokenType};
use serde_json::json;
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;

#[tokio::test]
async fn test_no_credential_is_unauthorized() {
    let (app, _db) = test_app().await;

    for uri in [
        "/api/v1/protected",
        "/api/v1/admin-only",
        "/api/v1/super-admin-only",
        "/api/suppliers",
        "/api/users",
        "/api/v1/delivery-challans",
    ] {
        let (status, json) = request(&app, "GET", uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Unauthorized");
    }
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let (app, _db) = test_app().await;

    let (status, json) = request(
        &app,
        "GET",
        "/api/v1/protected",
        None,
        Some("definitely.not.ajwt"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Invalid or expired token");
}

#[tokio::test]
async fn test_tampered_signature_is_unauthorized() {
    let (app, _db) = test_app().await;
    setup_super_admin(&app).await;

    let mut token = login(&app, "root", "root-password").await;
    let last = token.pop().unwrap();
    token.push(if last == 'A' { 'B' } else { 'A' });

    let (status, json) = request(&app, "GET", "/api/v1/protected", None, Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Invalid or expired token");
}

#[tokio::test]
async fn test_expired_token_is_unauthorized() {
    let (app, _db) = test_app().await;

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs();
    let claims = SessionClaims {
        sub: "uuid-1".to_string(),
        user_id: "alice".to_string(),
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
        role: UserRole::SuperAdmin,
        token_type: TokenType::Access,
        iat: now - 7200,
        exp: now - 3600,
    };
    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(TEST_JWT_SECRET),
    )
    .unwrap();

    let (status, json) = request(&app, "GET", "/api/v1/protected", None, Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Invalid or expired token");
}

#[tokio::test]
async fn test_protected_admits_every_role() {
    let (app, _db) = test_app().await;
    let (user, admin, root) = seed_all_roles(&app).await;

    for token in [&user, &admin, &root] {
        let (status, json) = request(&app, "GET", "/api/v1/protected", None, Some(token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "This is a protected endpoint");
    }
}

#[tokio::test]
async fn test_admin_only_denies_user() {
    let (app, _db) = test_app().await;
    let (user, _admin, _root) = seed_all_roles(&app).await;

    let (status, json) = request(&app, "GET", "/api/v1/admin-only", None, Some(&user)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Only admins can access this endpoint");
}

#[tokio::test]
async fn test_admin_only_admits_enumerated_roles() {
    let (app, _db) = test_app().await;
    let (_user, admin, root) = seed_all_roles(&app).await;

    // Both admin and super_admin are on the allow-list; the super admin
    // passes by enumeration, not hierarchy.
    for token in [&admin, &root] {
        let (status, json) = request(&app, "GET", "/api/v1/admin-only", None, Some(token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "This endpoint is admin-only");
    }
}

#[tokio::test]
async fn test_super_admin_only_denies_admin_and_user() {
    let (app, _db) = test_app().await;
    let (user, admin, root) = seed_all_roles(&app).await;

    for token in [&user, &admin] {
        let (status, json) =
            request(&app, "GET", "/api/v1/super-admin-only", None, Some(token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["message"], "Only super admins can access this endpoint");
    }

    let (status, json) = request(&app, "GET", "/api/v1/super-admin-only", None, Some(&root)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "This endpoint is super_admin-only");
}

#[tokio::test]
async fn test_bearer_header_fallback() {
    let (app, _db) = test_app().await;
    setup_super_admin(&app).await;
    let token = login(&app, "root", "root-password").await;

    let response = app
        .clone()
        .oneshot(
            axum::http::Request::builder()
                .method("GET")
                .uri("/api/v1/protected")
                .header("authorization", format!("Bearer {token}"))
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_claims_round_trip() {
    let (app, _db) = test_app().await;
    setup_super_admin(&app).await;

    let (_, login_json) = request(
        &app,
        "POST",
        "/api/auth/login",
        Some(json!({ "userId": "root", "password": "root-password" })),
        None,
    )
    .await;
    let token = login_json["data"]["accessToken"].as_str().unwrap();

    let (status, json) = request(&app, "GET", "/api/v1/protected", None, Some(token)).await;
    assert_eq!(status, StatusCode::OK);

    // The echoed claims match the identity the token was minted for.
    let user = &json["data"]["user"];
    assert_eq!(user["sub"], login_json["data"]["user"]["id"]);
    assert_eq!(user["userId"], "root");
    assert_eq!(user["name"], "Root Admin");
    assert_eq!(user["email"], "root@example.com");
    assert_eq!(user["role"], "super_admin");
}

#[tokio::test]
async fn test_authorization_is_idempotent() {
    let (app, _db) = test_app().await;
    let (user, _admin, _root) = seed_all_roles(&app).await;

    let (first_status, first_json) =
        request(&app, "GET", "/api/v1/admin-only", None, Some(&user)).await;
    let (second_status, second_json) =
        request(&app, "GET", "/api/v1/admin-only", None, Some(&user)).await;

    assert_eq!(first_status, second_status);
    assert_eq!(first_json, second_json);
}
