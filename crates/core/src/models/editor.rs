//! Staff editor accounts (admin-only management).

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{ListRow, Resource};
use crate::roles::Role;
use crate::types::{RecordId, Timestamp};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Editor {
    pub id: RecordId,
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub date_joined: Option<Timestamp>,
}

fn default_active() -> bool {
    true
}

impl Resource for Editor {
    const PATH: &'static str = "editors/";
    const ENTITY: &'static str = "editor";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn row(&self) -> ListRow {
        ListRow {
            id: self.id.clone(),
            title: format!("{} <{}> ({})", self.username, self.email, self.role),
            slug: None,
            published: Some(self.is_active),
        }
    }
}

/// DTO for creating an editor account.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CreateEditor {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 3, max = 150, message = "Username must be 3-150 characters"))]
    pub username: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub role: Role,
}
