//! Integration tests for list pages, the delete confirmation dialog and
//! app-level role checks.

mod common;

use assert_matches::assert_matches;
use quill_admin::{DeleteOutcome, ToastLevel};
use quill_client::ApiError;
use quill_core::error::CoreError;
use quill_core::models::{Blog, Tag};
use quill_core::pagination::ListParams;
use quill_core::roles::Role;
use quill_core::types::RecordId;
use serde_json::json;

use common::{app, drain, valid_blog_json};

#[tokio::test]
async fn confirm_deletes_exactly_once() {
    let mut server = mockito::Server::new_async().await;
    let delete = server
        .mock("DELETE", "/api/v1/blogs/3/")
        .with_status(204)
        .expect(1)
        .create_async()
        .await;
    let app = app(&server, Role::Editor);
    let mut toasts = app.toasts().subscribe();
    let mut dialog = app.delete_dialog::<Blog>();

    dialog.open_for(RecordId::Int(3));
    let outcome = dialog.confirm().await;
    // Dialog is closed now; a second confirm is a no-op.
    let again = dialog.confirm().await;

    delete.assert_async().await;
    assert_eq!(outcome, DeleteOutcome::Deleted(RecordId::Int(3)));
    assert_eq!(again, DeleteOutcome::NotOpen);
    assert!(!dialog.is_open());
    let toasts = drain(&mut toasts);
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].level, ToastLevel::Success);
}

#[tokio::test]
async fn cancel_issues_no_request() {
    let mut server = mockito::Server::new_async().await;
    let delete = server
        .mock("DELETE", mockito::Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let app = app(&server, Role::Editor);
    let mut dialog = app.delete_dialog::<Blog>();

    dialog.open_for(RecordId::Int(3));
    assert_eq!(dialog.target(), Some(&RecordId::Int(3)));
    dialog.cancel();

    assert!(!dialog.is_open());
    assert_eq!(dialog.confirm().await, DeleteOutcome::NotOpen);
    delete.assert_async().await;
}

#[tokio::test]
async fn failed_delete_keeps_the_dialog_open() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("DELETE", "/api/v1/tags/4/")
        .with_status(500)
        .with_body("oops")
        .create_async()
        .await;
    let app = app(&server, Role::Editor);
    let mut toasts = app.toasts().subscribe();
    let mut dialog = app.delete_dialog::<Tag>();

    dialog.open_for(RecordId::Int(4));
    let outcome = dialog.confirm().await;

    assert_matches!(outcome, DeleteOutcome::Failed(ref r) if r.message == "Failed to delete tag. Please try again.");
    assert!(dialog.is_open());
    let toasts = drain(&mut toasts);
    assert_eq!(toasts[0].level, ToastLevel::Error);
}

#[tokio::test]
async fn delete_refreshes_the_list() {
    let mut server = mockito::Server::new_async().await;
    let list = server
        .mock("GET", "/api/v1/blogs/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([valid_blog_json(3)]).to_string())
        .expect(2)
        .create_async()
        .await;
    server
        .mock("DELETE", "/api/v1/blogs/3/")
        .with_status(204)
        .create_async()
        .await;
    let app = app(&server, Role::Editor);
    let page = app.list_page::<Blog>(ListParams::default());

    let rows = page.rows().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].title, "Launch day");
    assert_eq!(rows[0].published, Some(false));
    // Cached.
    page.rows().await.unwrap();

    let mut dialog = app.delete_dialog::<Blog>();
    dialog.open_for(RecordId::Int(3));
    dialog.confirm().await;
    page.rows().await.unwrap();

    list.assert_async().await;
}

#[tokio::test]
async fn list_snapshot_reports_errors() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/v1/tags/")
        .with_status(500)
        .with_body("")
        .create_async()
        .await;
    let app = app(&server, Role::Editor);
    let page = app.list_page::<Tag>(ListParams::default());

    assert!(page.rows().await.is_err());
    let snapshot = page.snapshot().await;
    assert!(snapshot.is_error);
    assert!(snapshot.data.is_none());
}

#[tokio::test]
async fn editor_management_requires_admin() {
    let server = mockito::Server::new_async().await;

    let editor_app = app(&server, Role::Editor);
    assert_matches!(
        editor_app.editors().err(),
        Some(ApiError::Core(CoreError::Forbidden(_)))
    );

    let admin_app = app(&server, Role::Admin);
    assert!(admin_app.editors().is_ok());
}
