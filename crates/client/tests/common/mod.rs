//! Shared helpers for client integration tests.
//!
//! Every test gets its own `mockito` server; the client under test points
//! at `<server>/api/v1/` and starts logged in with token `test-token`.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use quill_client::{
    ApiClient, ClientConfig, MemorySessionStore, QueryCache, ResourceQuery, ResourceService,
    Session,
};
use quill_core::models::Resource;
use quill_core::roles::Role;
use serde_json::{json, Value};

pub const TOKEN: &str = "test-token";

pub fn config(server: &mockito::ServerGuard) -> ClientConfig {
    ClientConfig::for_base_url(&format!("{}/api/v1/", server.url()))
}

/// Client with an editor session already stored.
pub fn client(server: &mockito::ServerGuard) -> ApiClient {
    client_with_role(server, Role::Editor)
}

pub fn client_with_role(server: &mockito::ServerGuard, role: Role) -> ApiClient {
    let session = MemorySessionStore::with_session(Session {
        token: TOKEN.into(),
        role,
    });
    ApiClient::new(&config(server), Arc::new(session)).unwrap()
}

pub fn anonymous_client(server: &mockito::ServerGuard) -> ApiClient {
    ApiClient::new(&config(server), Arc::new(MemorySessionStore::new())).unwrap()
}

pub fn query<R: Resource>(server: &mockito::ServerGuard, stale_time: Duration) -> ResourceQuery<R> {
    ResourceQuery::new(
        ResourceService::new(client(server)),
        QueryCache::new(100, stale_time),
    )
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn blog_json(id: i64, slug: &str) -> Value {
    json!({
        "id": id,
        "title": format!("Post {id}"),
        "slug": slug,
        "content": "Body text",
        "excerpt": "",
        "meta_title": "Meta",
        "meta_description": "Meta description",
        "published": false,
        "images": [],
        "og_image": null,
        "tags": [{"id": 1, "name": "Rust", "slug": "rust"}],
        "author": "admin",
        "created_at": "2024-03-01T10:00:00Z",
        "updated_at": "2024-03-02T10:00:00Z"
    })
}

pub fn tag_json(id: i64, name: &str) -> Value {
    json!({ "id": id, "name": name, "slug": name.to_lowercase() })
}
