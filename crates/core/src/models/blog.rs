//! Blog post model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{BasicInfo, EditableRecord, ImageRef, ListRow, Resource, Tag};
use crate::sections::SectionsData;
use crate::types::{RecordId, Timestamp};

/// A row from the `blogs/` collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Blog {
    pub id: RecordId,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub meta_title: String,
    #[serde(default)]
    pub meta_description: String,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub images: Vec<ImageRef>,
    #[serde(default)]
    pub og_image: Option<String>,
    /// Tags as returned by the backend. Read-only; edits go to `tag_ids`.
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Tag selection made in the form. Unset means "the loaded tags".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_ids: Option<Vec<RecordId>>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections_data: Option<SectionsData>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

impl Resource for Blog {
    const PATH: &'static str = "blogs/";
    const ENTITY: &'static str = "blog";
    const QUERY_RETRIES: u32 = 1;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn slug(&self) -> Option<&str> {
        Some(&self.slug)
    }

    fn row(&self) -> ListRow {
        ListRow {
            id: self.id.clone(),
            title: self.title.clone(),
            slug: Some(self.slug.clone()),
            published: Some(self.published),
        }
    }
}

impl EditableRecord for Blog {
    const BODY_FIELD: &'static str = "content";
    const BODY_LABEL: &'static str = "Content";
    const READ_ONLY_FIELDS: &'static [&'static str] = &[
        "id",
        "images",
        "og_image",
        "tags",
        "author",
        "created_at",
        "updated_at",
    ];

    fn basic_info(&self) -> BasicInfo<'_> {
        BasicInfo {
            title: &self.title,
            slug: &self.slug,
            body: &self.content,
            meta_title: &self.meta_title,
            meta_description: &self.meta_description,
        }
    }

    fn sections(&self) -> Option<&SectionsData> {
        self.sections_data.as_ref()
    }

    fn extra_form_fields(&self, fields: &mut Map<String, Value>) {
        let ids: Vec<&RecordId> = match &self.tag_ids {
            Some(ids) => ids.iter().collect(),
            None => self.tags.iter().map(|t| &t.id).collect(),
        };
        if let Ok(value) = serde_json::to_value(ids) {
            fields.insert("tag_ids".into(), value);
        }
    }
}
