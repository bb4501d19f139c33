//! Tag model and DTO.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{ListRow, Resource};
use crate::types::RecordId;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

impl Resource for Tag {
    const PATH: &'static str = "tags/";
    const ENTITY: &'static str = "tag";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn slug(&self) -> Option<&str> {
        Some(&self.slug)
    }

    fn row(&self) -> ListRow {
        ListRow {
            id: self.id.clone(),
            title: self.name.clone(),
            slug: Some(self.slug.clone()),
            published: None,
        }
    }
}

/// DTO for creating a tag. The backend derives the slug.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CreateTag {
    #[validate(length(min = 1, max = 50, message = "Tag name must be 1-50 characters"))]
    pub name: String,
}
