//! Integration tests for the validate -> diff -> submit form pipeline.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use assert_matches::assert_matches;
use mockito::Matcher;
use quill_admin::{EditMode, EditSession, FormState, SubmitOutcome, ToastLevel};
use quill_core::backend_errors::GENERIC_SAVE_ERROR;
use quill_core::models::Blog;
use quill_core::payload::{Attachment, FileField};
use quill_core::roles::Role;
use quill_core::types::RecordId;
use quill_core::validation::{FormTab, MSG_SLUG_FORMAT, MSG_TITLE_SLUG_REQUIRED};
use serde_json::{json, Value};

use common::{app, drain, valid_blog, valid_blog_json};

/// A PATCH mock that must never be hit.
async fn forbid_patch(server: &mut mockito::ServerGuard) -> mockito::Mock {
    server
        .mock("PATCH", Matcher::Any)
        .expect(0)
        .create_async()
        .await
}

async fn open_blog(server: &mockito::ServerGuard) -> EditSession<Blog> {
    let mut session = app(server, Role::Editor).edit_session::<Blog>();
    session.open(valid_blog(3));
    session
}

// ---------------------------------------------------------------------------
// Client-side validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_title_halts_before_any_request() {
    let mut server = mockito::Server::new_async().await;
    let patch = forbid_patch(&mut server).await;
    let mut session = open_blog(&server).await;
    session.select_tab(FormTab::Sections);

    session.edit("title", |b| b.title.clear()).unwrap();
    let outcome = session.submit().await;

    patch.assert_async().await;
    assert_matches!(outcome, SubmitOutcome::Invalid(ref f) if f.message == MSG_TITLE_SLUG_REQUIRED);
    assert_eq!(session.active_tab(), FormTab::BasicInfo);
    assert_eq!(session.focused_field(), Some("title"));
    assert_eq!(session.state(), FormState::Editing);
    assert_eq!(
        session.draft().unwrap().error_for("title"),
        Some(MSG_TITLE_SLUG_REQUIRED)
    );
    assert_eq!(
        session.history(),
        [
            FormState::Idle,
            FormState::Editing,
            FormState::Validating,
            FormState::Invalid,
            FormState::Editing
        ]
    );
}

#[tokio::test]
async fn long_title_is_rejected() {
    let mut server = mockito::Server::new_async().await;
    let patch = forbid_patch(&mut server).await;
    let mut session = open_blog(&server).await;

    session
        .set_field("title", Value::String("A".repeat(41)))
        .unwrap();
    let outcome = session.submit().await;

    patch.assert_async().await;
    assert_matches!(
        outcome,
        SubmitOutcome::Invalid(ref f) if f.message == "title must be 40 characters or less"
    );
}

#[tokio::test]
async fn uppercase_slug_is_rejected() {
    let mut server = mockito::Server::new_async().await;
    let patch = forbid_patch(&mut server).await;
    let mut session = open_blog(&server).await;

    session.edit("slug", |b| b.slug = "Launch-Day".into()).unwrap();
    let outcome = session.submit().await;

    patch.assert_async().await;
    assert_matches!(outcome, SubmitOutcome::Invalid(ref f) if f.message == MSG_SLUG_FORMAT && f.field == "slug");
    assert_eq!(session.active_tab(), FormTab::BasicInfo);
}

#[tokio::test]
async fn section_failure_switches_to_the_sections_tab() {
    let mut server = mockito::Server::new_async().await;
    let patch = forbid_patch(&mut server).await;
    let mut session = open_blog(&server).await;

    session
        .set_field(
            "sections_data.hero_section",
            json!({ "title": "Welcome", "description": "Too short" }),
        )
        .unwrap();
    let outcome = session.submit().await;

    patch.assert_async().await;
    assert_matches!(
        outcome,
        SubmitOutcome::Invalid(ref f)
            if f.message == "Hero section description must be between 100 and 400 characters"
    );
    assert_eq!(session.active_tab(), FormTab::Sections);
    assert_eq!(
        session.focused_field(),
        Some("sections_data.hero_section.description")
    );
}

#[tokio::test]
async fn editing_a_field_clears_its_error() {
    let server = mockito::Server::new_async().await;
    let mut session = open_blog(&server).await;

    session.edit("title", |b| b.title.clear()).unwrap();
    session.submit().await;
    assert!(session.draft().unwrap().error_for("title").is_some());

    session.edit("title", |b| b.title = "Back again".into()).unwrap();
    assert_eq!(session.draft().unwrap().error_for("title"), None);
}

#[tokio::test]
async fn validation_failure_raises_an_error_toast() {
    let server = mockito::Server::new_async().await;
    let app = app(&server, Role::Editor);
    let mut toasts = app.toasts().subscribe();
    let mut session = app.edit_session::<Blog>();
    session.open(valid_blog(3));

    session.edit("meta_title", |b| b.meta_title.clear()).unwrap();
    session.submit().await;

    let toasts = drain(&mut toasts);
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].level, ToastLevel::Error);
    assert_eq!(toasts[0].message, "Meta title is required");
}

// ---------------------------------------------------------------------------
// Diff and submit
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unchanged_form_is_not_submitted() {
    let mut server = mockito::Server::new_async().await;
    let patch = forbid_patch(&mut server).await;
    let app = app(&server, Role::Editor);
    let mut toasts = app.toasts().subscribe();
    let mut session = app.edit_session::<Blog>();
    session.open(valid_blog(3));

    let outcome = session.submit().await;

    patch.assert_async().await;
    assert_matches!(outcome, SubmitOutcome::NothingToSave);
    assert_eq!(session.state(), FormState::Editing);
    let toasts = drain(&mut toasts);
    assert_eq!(toasts[0].level, ToastLevel::Info);
    assert_eq!(toasts[0].message, "No changes to save");
}

#[tokio::test]
async fn publishing_sends_exactly_one_field() {
    let mut server = mockito::Server::new_async().await;
    let mut saved = valid_blog_json(3);
    saved["published"] = Value::Bool(true);
    let patch = server
        .mock("PATCH", "/api/v1/blogs/3/")
        .match_header("content-type", Matcher::Regex("^multipart/form-data".into()))
        .match_body(Matcher::Regex(r#"name="published"\r\n\r\ntrue"#.into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(saved.to_string())
        .expect(1)
        .create_async()
        .await;

    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    let mut session = app(&server, Role::Editor)
        .edit_session::<Blog>()
        .on_success(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
    session.open(valid_blog(3));
    session.set_field("published", Value::Bool(true)).unwrap();

    let payload = session.draft().unwrap().build_payload().unwrap();
    assert_eq!(payload.field_names(), ["published"]);
    assert!(payload.files().is_empty());

    let outcome = session.submit().await;

    patch.assert_async().await;
    assert_matches!(outcome, SubmitOutcome::Saved(ref blog) if blog.published);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(session.state(), FormState::Idle);
    assert!(session.draft().is_none());
}

#[tokio::test]
async fn attached_file_alone_is_submitted() {
    let mut server = mockito::Server::new_async().await;
    let patch = server
        .mock("PATCH", "/api/v1/blogs/3/")
        .match_body(Matcher::Regex(
            r#"name="og_image_file"; filename="cover.jpg""#.into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(valid_blog_json(3).to_string())
        .expect(1)
        .create_async()
        .await;
    let mut session = open_blog(&server).await;

    session
        .attach(Attachment::new(FileField::OgImage, "cover.jpg", vec![0xFF, 0xD8]))
        .unwrap();
    let outcome = session.submit().await;

    patch.assert_async().await;
    assert_matches!(outcome, SubmitOutcome::Saved(_));
}

#[tokio::test]
async fn backend_field_error_keeps_the_draft_and_focuses_the_field() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("PATCH", "/api/v1/blogs/3/")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"slug": ["blog with this slug already exists."]}"#)
        .create_async()
        .await;
    let mut session = open_blog(&server).await;
    session.select_tab(FormTab::Images);

    session.edit("slug", |b| b.slug = "taken".into()).unwrap();
    let outcome = session.submit().await;

    assert_matches!(outcome, SubmitOutcome::Failed(ref r) if r.field.as_deref() == Some("slug"));
    assert_eq!(session.state(), FormState::Editing);
    assert_eq!(session.active_tab(), FormTab::BasicInfo);
    assert_eq!(session.focused_field(), Some("slug"));
    let draft = session.draft().unwrap();
    assert_eq!(draft.current().slug, "taken");
    assert_eq!(
        draft.error_for("slug"),
        Some("blog with this slug already exists.")
    );
    assert_eq!(
        &session.history()[session.history().len() - 3..],
        [FormState::Submitting, FormState::Failure, FormState::Editing]
    );
}

#[tokio::test]
async fn unstructured_backend_error_falls_back_to_generic_message() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("PATCH", "/api/v1/blogs/3/")
        .with_status(500)
        .with_body("<html>Internal Server Error</html>")
        .create_async()
        .await;
    let app = app(&server, Role::Editor);
    let mut toasts = app.toasts().subscribe();
    let mut session = app.edit_session::<Blog>();
    session.open(valid_blog(3));

    session.edit("excerpt", |b| b.excerpt = "New excerpt".into()).unwrap();
    let outcome = session.submit().await;

    assert_matches!(outcome, SubmitOutcome::Failed(ref r) if r.message == GENERIC_SAVE_ERROR);
    assert!(session.draft().is_some());
    assert_eq!(drain(&mut toasts)[0].message, GENERIC_SAVE_ERROR);
}

#[tokio::test]
async fn failed_submit_can_be_retried() {
    let mut server = mockito::Server::new_async().await;
    let failing = server
        .mock("PATCH", "/api/v1/blogs/3/")
        .with_status(503)
        .with_body("")
        .expect(1)
        .create_async()
        .await;
    let mut session = open_blog(&server).await;
    session.edit("excerpt", |b| b.excerpt = "Retry me".into()).unwrap();

    assert_matches!(session.submit().await, SubmitOutcome::Failed(_));
    failing.assert_async().await;
    failing.remove_async().await;

    server
        .mock("PATCH", "/api/v1/blogs/3/")
        .match_body(Matcher::Regex(r#"name="excerpt""#.into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(valid_blog_json(3).to_string())
        .create_async()
        .await;
    assert_matches!(session.submit().await, SubmitOutcome::Saved(_));
}

// ---------------------------------------------------------------------------
// Loading and creating
// ---------------------------------------------------------------------------

#[tokio::test]
async fn load_by_slug_opens_an_update_form() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/v1/blogs/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([valid_blog_json(3)]).to_string())
        .create_async()
        .await;
    server
        .mock("GET", "/api/v1/blogs/3/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(valid_blog_json(3).to_string())
        .create_async()
        .await;
    let mut session = app(&server, Role::Editor).edit_session::<Blog>();

    session.load("launch-day").await.unwrap();

    assert_eq!(session.mode(), &EditMode::Update(RecordId::Int(3)));
    assert_eq!(session.state(), FormState::Editing);
    assert!(!session.draft().unwrap().has_changes());
}

#[tokio::test]
async fn load_of_unknown_slug_leaves_the_form_idle() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/v1/blogs/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create_async()
        .await;
    let mut session = app(&server, Role::Editor).edit_session::<Blog>();

    let err = session.load("nope").await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(session.state(), FormState::Idle);
    assert!(session.draft().is_none());
}

#[tokio::test]
async fn new_record_is_posted_to_the_collection() {
    let mut server = mockito::Server::new_async().await;
    let post = server
        .mock("POST", "/api/v1/blogs/")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="title"\r\n\r\nLaunch day"#.into()),
            Matcher::Regex(r#"name="slug"\r\n\r\nlaunch-day"#.into()),
        ]))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(valid_blog_json(12).to_string())
        .expect(1)
        .create_async()
        .await;
    let mut session = app(&server, Role::Editor).edit_session::<Blog>();
    session.new_record();

    let template = valid_blog(0);
    session
        .edit("title", |b| {
            b.title = template.title.clone();
            b.slug = template.slug.clone();
            b.content = template.content.clone();
            b.meta_title = template.meta_title.clone();
            b.meta_description = template.meta_description.clone();
        })
        .unwrap();
    let outcome = session.submit().await;

    post.assert_async().await;
    assert_matches!(outcome, SubmitOutcome::Saved(ref b) if b.id == RecordId::Int(12));
}

#[tokio::test]
async fn submit_without_an_open_record_does_nothing() {
    let server = mockito::Server::new_async().await;
    let mut session = app(&server, Role::Editor).edit_session::<Blog>();

    assert_matches!(session.submit().await, SubmitOutcome::Failed(_));
    assert_eq!(session.state(), FormState::Idle);
    assert!(session.set_field("title", json!("x")).is_err());
}
