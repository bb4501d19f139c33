//! Domain types and pure form logic for the Quill content admin.
//!
//! Everything in this crate is in-memory: record models, the typed
//! section schema, validation rules, draft state, diffing and multipart
//! payload assembly. The HTTP side lives in `quill-client`.

pub mod backend_errors;
pub mod diff;
pub mod draft;
pub mod error;
pub mod models;
pub mod pagination;
pub mod payload;
pub mod roles;
pub mod sections;
pub mod types;
pub mod validation;
