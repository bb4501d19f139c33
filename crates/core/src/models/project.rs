//! Portfolio project model.

use serde::{Deserialize, Serialize};

use super::{BasicInfo, EditableRecord, ListRow, Resource};
use crate::sections::SectionsData;
use crate::types::{RecordId, Timestamp};
use crate::validation::{validate_project, RuleResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: RecordId,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub project_url: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

impl Resource for Project {
    const PATH: &'static str = "projects/";
    const ENTITY: &'static str = "project";

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

/// Projects have no SEO fields and no sections; they use a shorter rule
/// list.
impl EditableRecord for Project {
    const BODY_FIELD: &'static str = "description";
    const BODY_LABEL: &'static str = "Description";
    const READ_ONLY_FIELDS: &'static [&'static str] =
        &["id", "image", "created_at", "updated_at"];

    fn basic_info(&self) -> BasicInfo<'_> {
        BasicInfo {
            title: &self.title,
            slug: &self.slug,
            body: &self.description,
            meta_title: "",
            meta_description: "",
        }
    }

    fn sections(&self) -> Option<&SectionsData> {
        None
    }

    fn validate(&self) -> RuleResult {
        validate_project(self)
    }
}
