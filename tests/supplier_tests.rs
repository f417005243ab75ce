mod common;

use axum::http::StatusCode;
use common::{login, request, setup_super_admin, test_app};

#[tokio::test]
async fn test_suppliers_require_auth() {
    let (app, _db) = test_app().await;

    let (status, json) = request(&app, "GET", "/api/suppliers", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Unauthorized");
}

#[tokio::test]
async fn test_suppliers_empty() {
    let (app, _db) = test_app().await;
    setup_super_admin(&app).await;
    let token = login(&app, "root", "root-password").await;

    let (status, json) = request(&app, "GET", "/api/suppliers", None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "No suppliers found");
    assert_eq!(json["data"]["suppliers"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_suppliers_listing() {
    let (app, db) = test_app().await;
    setup_super_admin(&app).await;
    let token = login(&app, "root", "root-password").await;

    db.parties()
        .create("p-1", "Sri Steels", Some("98400 00000"))
        .await
        .unwrap();
    db.parties().create("p-2", "Anand Metals", None).await.unwrap();

    let (status, json) = request(&app, "GET", "/api/suppliers", None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Suppliers found");

    let suppliers = json["data"]["suppliers"].as_array().unwrap();
    assert_eq!(suppliers.len(), 2);
    assert_eq!(suppliers[0]["name"], "Anand Metals");
    assert_eq!(suppliers[1]["name"], "Sri Steels");
    assert_eq!(suppliers[1]["contact"], "98400 00000");
}
