//! Service page model.

use serde::{Deserialize, Serialize};

use super::{BasicInfo, EditableRecord, ImageRef, ListRow, Resource};
use crate::sections::SectionsData;
use crate::types::{RecordId, Timestamp};

/// A row from the `services/` collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: RecordId,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
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
    /// Icon URL shown on the services overview.
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections_data: Option<SectionsData>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

impl Resource for Service {
    const PATH: &'static str = "services/";
    const ENTITY: &'static str = "service";
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

impl EditableRecord for Service {
    const BODY_FIELD: &'static str = "description";
    const BODY_LABEL: &'static str = "Description";
    const READ_ONLY_FIELDS: &'static [&'static str] = &[
        "id",
        "images",
        "og_image",
        "icon",
        "created_at",
        "updated_at",
    ];

    fn basic_info(&self) -> BasicInfo<'_> {
        BasicInfo {
            title: &self.title,
            slug: &self.slug,
            body: &self.description,
            meta_title: &self.meta_title,
            meta_description: &self.meta_description,
        }
    }

    fn sections(&self) -> Option<&SectionsData> {
        self.sections_data.as_ref()
    }
}
