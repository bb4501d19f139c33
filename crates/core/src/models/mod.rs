//! Backend record models and the traits the client and form layers use
//! to handle them generically.

pub mod auth;
pub mod blog;
pub mod editor;
pub mod industry;
pub mod media;
pub mod project;
pub mod service;
pub mod tag;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::sections::SectionsData;
use crate::types::RecordId;
use crate::validation::{validate_record, RuleResult};

pub use auth::{LoginRequest, LoginResponse};
pub use blog::Blog;
pub use editor::{CreateEditor, Editor};
pub use industry::Industry;
pub use media::Media;
pub use project::Project;
pub use service::Service;
pub use tag::{CreateTag, Tag};

// ---------------------------------------------------------------------------
// Resource metadata
// ---------------------------------------------------------------------------

/// A record type served by one REST collection endpoint.
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection path relative to the API base, with trailing slash
    /// (e.g. `"blogs/"`).
    const PATH: &'static str;

    /// Singular entity name for messages and logs.
    const ENTITY: &'static str;

    /// How many times a failed read is retried before surfacing the error.
    const QUERY_RETRIES: u32 = 0;

    fn id(&self) -> &RecordId;

    /// Unique slug, for entities that have one.
    fn slug(&self) -> Option<&str> {
        None
    }

    /// One line of a list page.
    fn row(&self) -> ListRow;
}

/// Summary used when rendering a collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListRow {
    pub id: RecordId,
    pub title: String,
    pub slug: Option<String>,
    pub published: Option<bool>,
}

// ---------------------------------------------------------------------------
// Editable records (multi-section forms)
// ---------------------------------------------------------------------------

/// Fields every multi-section form validates before anything else.
#[derive(Debug, Clone, Copy)]
pub struct BasicInfo<'a> {
    pub title: &'a str,
    pub slug: &'a str,
    pub body: &'a str,
    pub meta_title: &'a str,
    pub meta_description: &'a str,
}

/// A record edited through the multi-section form (blogs, services,
/// industries).
pub trait EditableRecord: Resource + Default {
    /// Name of the long-form body field.
    const BODY_FIELD: &'static str;

    /// Label of the body field in messages.
    const BODY_LABEL: &'static str;

    /// Keys computed or managed by the server. They are never diffed and
    /// never submitted.
    const READ_ONLY_FIELDS: &'static [&'static str] =
        &["id", "images", "og_image", "created_at", "updated_at"];

    fn basic_info(&self) -> BasicInfo<'_>;

    fn sections(&self) -> Option<&SectionsData>;

    /// Ordered form rules; stops at the first violation.
    fn validate(&self) -> RuleResult {
        validate_record(self)
    }

    /// The record as the form sees it: the serialized record without
    /// read-only keys.
    fn form_fields(&self) -> Map<String, Value> {
        let mut fields = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        for key in Self::READ_ONLY_FIELDS {
            fields.remove(*key);
        }
        self.extra_form_fields(&mut fields);
        fields
    }

    /// Form-only fields derived from server-managed ones.
    fn extra_form_fields(&self, _fields: &mut Map<String, Value>) {}
}

/// Reference to an image already stored by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(alias = "url")]
    pub image: String,
    #[serde(default)]
    pub alt_text: String,
}
