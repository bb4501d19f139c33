//! HTTP client for the content backend.
//!
//! - [`http::ApiClient`] -- base URL handling, bearer-token attachment and
//!   status/error normalization on top of [`reqwest`].
//! - [`service::ResourceService`] -- list / get / get-by-slug / create /
//!   update / delete for one collection.
//! - [`query::ResourceQuery`] -- cached reads with a freshness window and
//!   mutations that invalidate the cache.
//! - [`auth::AuthService`] and [`session`] -- login and token persistence.

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod query;
pub mod service;
pub mod session;

pub use auth::AuthService;
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{ApiClient, RequestBody};
pub use query::{Cached, QueryCache, QueryKey, QueryScope, QuerySnapshot, ResourceQuery};
pub use service::ResourceService;
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore};
