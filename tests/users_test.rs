mod common;

use common::TestApp;
use docflow_service::models::Role;
use serde_json::Value;

#[tokio::test]
async fn me_returns_the_resolved_actor() {
    let app = TestApp::spawn().await;
    let (editor, cookie) = app.seed_user(Role::Editor).await;

    let response = app.get("/api/users/me", &cookie).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["role"], "editor");
    assert_eq!(body["email"], editor.email);

    app.cleanup().await;
}

#[tokio::test]
async fn user_listing_is_admin_only() {
    let app = TestApp::spawn().await;
    let (admin, admin_cookie) = app.seed_user(Role::Admin).await;
    let (viewer, viewer_cookie) = app.seed_user(Role::Viewer).await;

    let response = app.get("/api/users", &viewer_cookie).await;
    assert_eq!(response.status(), 403);

    let response = app.get("/api/users", &admin_cookie).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    let emails: Vec<&str> = users.iter().map(|u| u["email"].as_str().unwrap()).collect();
    assert!(emails.contains(&admin.email.as_str()));
    assert!(emails.contains(&viewer.email.as_str()));

    app.cleanup().await;
}
