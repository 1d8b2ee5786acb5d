mod common;

use common::TestApp;
use docflow_service::models::Role;
use serde_json::{json, Value};

async fn fetch(app: &TestApp, cookie: &str, id: &str) -> Value {
    app.get(&format!("/api/documents/{}", id), cookie)
        .await
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn every_status_value_round_trips() {
    let app = TestApp::spawn().await;
    let (_admin, cookie) = app.seed_user(Role::Admin).await;

    let uploaded = app.upload_text(&cookie, "a.txt", "text").await;
    let id = uploaded["id"].as_str().unwrap();

    // No transition graph: any order is legal, including Approved -> Draft.
    for status in ["InReview", "Approved", "Draft"] {
        let response = app
            .put_json(
                &format!("/api/documents/workflow/{}", id),
                &cookie,
                &json!({ "status": status }),
            )
            .await;
        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["document"]["workflow"]["status"], status);
        assert_eq!(fetch(&app, &cookie, id).await["workflow"]["status"], status);
    }

    app.cleanup().await;
}

#[tokio::test]
async fn bogus_status_is_rejected_and_nothing_changes() {
    let app = TestApp::spawn().await;
    let (_admin, cookie) = app.seed_user(Role::Admin).await;

    let uploaded = app.upload_text(&cookie, "a.txt", "text").await;
    let id = uploaded["id"].as_str().unwrap();

    for bogus in ["Bogus", "In Review", "draft"] {
        let response = app
            .put_json(
                &format!("/api/documents/workflow/{}", id),
                &cookie,
                &json!({ "status": bogus }),
            )
            .await;
        assert_eq!(response.status(), 400, "status {:?} should be rejected", bogus);
    }

    assert_eq!(fetch(&app, &cookie, id).await["workflow"]["status"], "Draft");

    app.cleanup().await;
}

#[tokio::test]
async fn reviewers_are_replaced_wholesale() {
    let app = TestApp::spawn().await;
    let (_admin, cookie) = app.seed_user(Role::Admin).await;

    let uploaded = app.upload_text(&cookie, "a.txt", "text").await;
    let id = uploaded["id"].as_str().unwrap();

    let u1 = uuid::Uuid::new_v4().to_string();
    let u2 = uuid::Uuid::new_v4().to_string();
    let u3 = uuid::Uuid::new_v4().to_string();

    let response = app
        .put_json(
            &format!("/api/documents/workflow/{}", id),
            &cookie,
            &json!({ "status": "InReview", "reviewerIds": [u1, u2] }),
        )
        .await;
    assert_eq!(response.status(), 200);
    let document = fetch(&app, &cookie, id).await;
    assert_eq!(document["workflow"]["status"], "InReview");
    assert_eq!(document["workflow"]["reviewers"], json!([u1, u2]));

    // Second assignment replaces, never merges.
    let response = app
        .put_json(
            &format!("/api/documents/workflow/{}", id),
            &cookie,
            &json!({ "reviewerIds": [u3] }),
        )
        .await;
    assert_eq!(response.status(), 200);
    let document = fetch(&app, &cookie, id).await;
    assert_eq!(document["workflow"]["reviewers"], json!([u3]));
    // Status untouched when only reviewers are sent.
    assert_eq!(document["workflow"]["status"], "InReview");

    app.cleanup().await;
}

#[tokio::test]
async fn malformed_reviewer_ids_are_rejected() {
    let app = TestApp::spawn().await;
    let (_admin, cookie) = app.seed_user(Role::Admin).await;

    let uploaded = app.upload_text(&cookie, "a.txt", "text").await;
    let id = uploaded["id"].as_str().unwrap();

    let response = app
        .put_json(
            &format!("/api/documents/workflow/{}", id),
            &cookie,
            &json!({ "reviewerIds": ["not-a-uuid"] }),
        )
        .await;
    assert_eq!(response.status(), 400);
    assert_eq!(fetch(&app, &cookie, id).await["workflow"]["reviewers"], json!([]));

    app.cleanup().await;
}

#[tokio::test]
async fn empty_update_is_rejected() {
    let app = TestApp::spawn().await;
    let (_admin, cookie) = app.seed_user(Role::Admin).await;

    let uploaded = app.upload_text(&cookie, "a.txt", "text").await;
    let id = uploaded["id"].as_str().unwrap();

    let response = app
        .put_json(&format!("/api/documents/workflow/{}", id), &cookie, &json!({}))
        .await;
    assert_eq!(response.status(), 400);

    app.cleanup().await;
}

#[tokio::test]
async fn workflow_update_is_admin_only() {
    let app = TestApp::spawn().await;
    let (_admin, admin_cookie) = app.seed_user(Role::Admin).await;
    let (_editor, editor_cookie) = app.seed_user(Role::Editor).await;

    let uploaded = app.upload_text(&admin_cookie, "a.txt", "text").await;
    let id = uploaded["id"].as_str().unwrap();

    let response = app
        .put_json(
            &format!("/api/documents/workflow/{}", id),
            &editor_cookie,
            &json!({ "status": "Approved" }),
        )
        .await;
    assert_eq!(response.status(), 403);

    app.cleanup().await;
}

#[tokio::test]
async fn update_after_delete_surfaces_not_found() {
    let app = TestApp::spawn().await;
    let (_admin, cookie) = app.seed_user(Role::Admin).await;

    let uploaded = app.upload_text(&cookie, "a.txt", "text").await;
    let id = uploaded["id"].as_str().unwrap().to_string();

    let response = app.delete(&format!("/api/documents/{}", id), &cookie).await;
    assert_eq!(response.status(), 200);

    // The lost-the-race side observes NotFound; no partial write survives.
    let response = app
        .put_json(
            &format!("/api/documents/workflow/{}", id),
            &cookie,
            &json!({ "status": "Approved" }),
        )
        .await;
    assert_eq!(response.status(), 404);

    app.cleanup().await;
}

#[tokio::test]
async fn workflow_update_appends_one_activity() {
    let app = TestApp::spawn().await;
    let (_admin, cookie) = app.seed_user(Role::Admin).await;

    let uploaded = app.upload_text(&cookie, "q1.txt", "text").await;
    let id = uploaded["id"].as_str().unwrap();

    let response = app
        .put_json(
            &format!("/api/documents/workflow/{}", id),
            &cookie,
            &json!({ "status": "InReview" }),
        )
        .await;
    assert_eq!(response.status(), 200);

    let body: Value = app.get("/api/activities", &cookie).await.json().await.unwrap();
    let activities = body["activities"].as_array().unwrap();
    let workflow_entries: Vec<&Value> = activities
        .iter()
        .filter(|a| a["action"] == "Workflow Updated")
        .collect();
    assert_eq!(workflow_entries.len(), 1);
    assert_eq!(
        workflow_entries[0]["details"],
        "Updated workflow for q1.txt to InReview"
    );
    // Newest first: the workflow entry precedes the upload entry.
    assert_eq!(activities[0]["action"], "Workflow Updated");
    assert_eq!(activities[1]["action"], "Document Uploaded");

    app.cleanup().await;
}
