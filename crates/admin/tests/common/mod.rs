//! Shared helpers for admin integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use quill_admin::{AdminApp, Toast};
use quill_client::{ClientConfig, MemorySessionStore, Session};
use quill_core::models::Blog;
use quill_core::roles::Role;
use serde_json::{json, Value};
use tokio::sync::broadcast;

pub fn app(server: &mockito::ServerGuard, role: Role) -> AdminApp {
    let config = ClientConfig::for_base_url(&format!("{}/api/v1/", server.url()));
    let session = MemorySessionStore::with_session(Session {
        token: "test-token".into(),
        role,
    });
    AdminApp::new(config, Arc::new(session)).unwrap()
}

/// A blog that passes every form rule.
pub fn valid_blog_json(id: i64) -> Value {
    json!({
        "id": id,
        "title": "Launch day",
        "slug": "launch-day",
        "content": "We shipped.",
        "excerpt": "",
        "meta_title": "Launch day",
        "meta_description": "Notes from launch day",
        "published": false,
        "images": [],
        "og_image": null,
        "tags": [{"id": 1, "name": "News", "slug": "news"}],
        "author": "admin",
        "created_at": "2024-03-01T10:00:00Z",
        "updated_at": "2024-03-02T10:00:00Z"
    })
}

pub fn valid_blog(id: i64) -> Blog {
    serde_json::from_value(valid_blog_json(id)).unwrap()
}

/// Everything published so far, without waiting.
pub fn drain(rx: &mut broadcast::Receiver<Toast>) -> Vec<Toast> {
    let mut toasts = Vec::new();
    while let Ok(toast) = rx.try_recv() {
        toasts.push(toast);
    }
    toasts
}
