mod common;

use common::TestApp;
use docflow_service::models::Role;
use serde_json::{json, Value};

#[tokio::test]
async fn upload_and_get_document_works() {
    let app = TestApp::spawn().await;
    let (editor, cookie) = app.seed_user(Role::Editor).await;

    let uploaded = app
        .upload_text(&cookie, "notes.txt", "quarterly revenue grew by ten percent")
        .await;
    assert_eq!(uploaded["filename"], "notes.txt");
    assert_eq!(uploaded["ownerId"], editor.id);
    assert_eq!(uploaded["workflow"]["status"], "Draft");
    assert_eq!(uploaded["workflow"]["reviewers"], json!([]));
    assert!(uploaded["folderId"].is_null());

    let response = app
        .get(&format!("/api/documents/{}", uploaded["id"].as_str().unwrap()), &cookie)
        .await;
    assert_eq!(response.status(), 200);
    let fetched: Value = response.json().await.unwrap();
    assert_eq!(fetched["content"], "quarterly revenue grew by ten percent");
    assert_eq!(fetched["mimetype"], "text/plain");
    // Mock summarizer runs at ingest.
    assert!(fetched["summary"].as_str().unwrap().starts_with("Summary: "));

    app.cleanup().await;
}

#[tokio::test]
async fn viewer_cannot_upload() {
    let app = TestApp::spawn().await;
    let (_viewer, cookie) = app.seed_user(Role::Viewer).await;

    let response = app
        .upload(&cookie, "notes.txt", "text/plain", b"text".to_vec(), None)
        .await;
    assert_eq!(response.status(), 403);

    app.cleanup().await;
}

#[tokio::test]
async fn disallowed_mimetype_is_rejected() {
    let app = TestApp::spawn().await;
    let (_editor, cookie) = app.seed_user(Role::Editor).await;

    let response = app
        .upload(&cookie, "archive.zip", "application/zip", b"PK".to_vec(), None)
        .await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "File type not allowed");

    app.cleanup().await;
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let app = TestApp::spawn().await;
    let (_editor, cookie) = app.seed_user(Role::Editor).await;

    let bytes = vec![b'a'; 10 * 1024 * 1024 + 1];
    let response = app.upload(&cookie, "big.txt", "text/plain", bytes, None).await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "File too large");

    app.cleanup().await;
}

// Larger than axum's 2 MiB default body limit but under the 10 MiB cap;
// the upload route raises the limit so only the cap rejects.
#[tokio::test]
async fn upload_between_default_body_limit_and_cap_is_accepted() {
    let app = TestApp::spawn().await;
    let (_editor, cookie) = app.seed_user(Role::Editor).await;

    let bytes = vec![b'a'; 5 * 1024 * 1024];
    let response = app
        .upload(&cookie, "mid.txt", "text/plain", bytes, None)
        .await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["filename"], "mid.txt");

    app.cleanup().await;
}

#[tokio::test]
async fn upload_into_missing_folder_is_not_found() {
    let app = TestApp::spawn().await;
    let (_editor, cookie) = app.seed_user(Role::Editor).await;

    let missing = uuid::Uuid::new_v4().to_string();
    let response = app
        .upload(&cookie, "a.txt", "text/plain", b"text".to_vec(), Some(&missing))
        .await;
    assert_eq!(response.status(), 404);

    let response = app
        .upload(&cookie, "a.txt", "text/plain", b"text".to_vec(), Some("not-a-uuid"))
        .await;
    assert_eq!(response.status(), 400);

    app.cleanup().await;
}

#[tokio::test]
async fn extraction_failure_does_not_fail_the_upload() {
    let app = TestApp::spawn().await;
    let (_editor, cookie) = app.seed_user(Role::Editor).await;

    // Not a real PDF; extraction fails and the marker is stored instead.
    let response = app
        .upload(&cookie, "broken.pdf", "application/pdf", b"not a pdf".to_vec(), None)
        .await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    assert!(body["content"]
        .as_str()
        .unwrap()
        .starts_with("Error extracting text:"));
    assert!(body["summary"].is_null());

    app.cleanup().await;
}

#[tokio::test]
async fn download_returns_the_original_bytes() {
    let app = TestApp::spawn().await;
    let (_editor, cookie) = app.seed_user(Role::Editor).await;

    let uploaded = app.upload_text(&cookie, "raw.txt", "the raw bytes").await;
    let file_id = uploaded["fileId"].as_str().unwrap();

    let response = app.get(&format!("/api/documents/file/{}", file_id), &cookie).await;
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "text/plain"
    );
    assert_eq!(response.bytes().await.unwrap().as_ref(), b"the raw bytes");

    let response = app
        .get(&format!("/api/documents/file/{}", uuid::Uuid::new_v4()), &cookie)
        .await;
    assert_eq!(response.status(), 404);

    app.cleanup().await;
}

#[tokio::test]
async fn list_and_search_documents() {
    let app = TestApp::spawn().await;
    let (_editor, cookie) = app.seed_user(Role::Editor).await;
    let (_viewer, viewer_cookie) = app.seed_user(Role::Viewer).await;

    app.upload_text(&cookie, "q1-report.txt", "alpha contents").await;
    app.upload_text(&cookie, "meeting-notes.txt", "beta contents").await;

    // Reads are not owner-scoped: the viewer sees everything.
    let response = app.get("/api/documents", &viewer_cookie).await;
    assert_eq!(response.status(), 200);
    let all: Value = response.json().await.unwrap();
    assert_eq!(all.as_array().unwrap().len(), 2);

    let response = app.get("/api/documents?search=alpha", &viewer_cookie).await;
    let found: Value = response.json().await.unwrap();
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["filename"], "q1-report.txt");

    app.cleanup().await;
}

#[tokio::test]
async fn rename_document_works() {
    let app = TestApp::spawn().await;
    let (_editor, cookie) = app.seed_user(Role::Editor).await;
    let (_viewer, viewer_cookie) = app.seed_user(Role::Viewer).await;

    let uploaded = app.upload_text(&cookie, "old.txt", "text").await;
    let id = uploaded["id"].as_str().unwrap();

    let response = app
        .put_json(
            &format!("/api/documents/rename/{}", id),
            &viewer_cookie,
            &json!({ "filename": "new.txt" }),
        )
        .await;
    assert_eq!(response.status(), 403);

    let response = app
        .put_json(
            &format!("/api/documents/rename/{}", id),
            &cookie,
            &json!({ "filename": "  " }),
        )
        .await;
    assert_eq!(response.status(), 400);

    let response = app
        .put_json(
            &format!("/api/documents/rename/{}", id),
            &cookie,
            &json!({ "filename": "new.txt" }),
        )
        .await;
    assert_eq!(response.status(), 200);

    let fetched: Value = app
        .get(&format!("/api/documents/{}", id), &cookie)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["filename"], "new.txt");

    app.cleanup().await;
}

#[tokio::test]
async fn update_content_replaces_the_blob() {
    let app = TestApp::spawn().await;
    let (_editor, cookie) = app.seed_user(Role::Editor).await;

    let uploaded = app.upload_text(&cookie, "a.txt", "first version").await;
    let id = uploaded["id"].as_str().unwrap();
    let old_file_id = uploaded["fileId"].as_str().unwrap().to_string();

    let response = app
        .put_json(
            &format!("/api/documents/{}", id),
            &cookie,
            &json!({ "content": "second version" }),
        )
        .await;
    assert_eq!(response.status(), 200);

    let fetched: Value = app
        .get(&format!("/api/documents/{}", id), &cookie)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["content"], "second version");
    let new_file_id = fetched["fileId"].as_str().unwrap();
    assert_ne!(new_file_id, old_file_id);

    // The old blob is gone, the new one serves the new text.
    let response = app
        .get(&format!("/api/documents/file/{}", old_file_id), &cookie)
        .await;
    assert_eq!(response.status(), 404);
    let response = app
        .get(&format!("/api/documents/file/{}", new_file_id), &cookie)
        .await;
    assert_eq!(response.bytes().await.unwrap().as_ref(), b"second version");

    app.cleanup().await;
}

#[tokio::test]
async fn delete_document_is_admin_only_and_removes_the_blob() {
    let app = TestApp::spawn().await;
    let (_admin, admin_cookie) = app.seed_user(Role::Admin).await;
    let (_editor, editor_cookie) = app.seed_user(Role::Editor).await;

    let uploaded = app.upload_text(&editor_cookie, "doomed.txt", "text").await;
    let id = uploaded["id"].as_str().unwrap();
    let file_id = uploaded["fileId"].as_str().unwrap();

    let response = app.delete(&format!("/api/documents/{}", id), &editor_cookie).await;
    assert_eq!(response.status(), 403);

    let response = app.delete(&format!("/api/documents/{}", id), &admin_cookie).await;
    assert_eq!(response.status(), 200);

    let response = app.get(&format!("/api/documents/{}", id), &admin_cookie).await;
    assert_eq!(response.status(), 404);
    let response = app
        .get(&format!("/api/documents/file/{}", file_id), &admin_cookie)
        .await;
    assert_eq!(response.status(), 404);

    app.cleanup().await;
}
