//! Media library asset model.

use serde::{Deserialize, Serialize};

use super::{ListRow, Resource};
use crate::types::{RecordId, Timestamp};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Media {
    pub id: RecordId,
    /// Public URL of the stored file.
    pub file: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub alt_text: String,
    #[serde(default)]
    pub uploaded_at: Option<Timestamp>,
}

impl Resource for Media {
    const PATH: &'static str = "media/";
    const ENTITY: &'static str = "media";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn row(&self) -> ListRow {
        let title = if self.title.is_empty() {
            self.file.clone()
        } else {
            self.title.clone()
        };
        ListRow {
            id: self.id.clone(),
            title,
            slug: None,
            published: None,
        }
    }
}
