//! Transport-agnostic multipart payload.
//!
//! [`FormPayload`] is an ordered list of text fields plus file attachments,
//! with the fixed field names the backend expects. The client crate turns
//! it into a `multipart/form-data` body.

use std::fmt;

use serde_json::Value;

use crate::diff::FieldChange;
use crate::sections::SectionKind;

// ---------------------------------------------------------------------------
// File fields
// ---------------------------------------------------------------------------

/// Where an attached file goes in the multipart body.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FileField {
    /// Gallery image; may be attached several times.
    Images,
    OgImage,
    HeroSectionImage,
    /// Icon of the sub-section at `index` within `section`.
    SectionIcon { section: SectionKind, index: usize },
    /// Avatar of the team member at `index`.
    TeamAvatar { index: usize },
    /// Media-library upload.
    MediaFile,
    /// Project cover image.
    ProjectImage,
}

impl FileField {
    /// Multipart field name expected by the backend.
    pub fn form_name(&self) -> String {
        match self {
            Self::Images => "image_files".into(),
            Self::OgImage => "og_image_file".into(),
            Self::HeroSectionImage => "hero_section_image_file".into(),
            Self::SectionIcon { section, index } => format!("{}_icon_{index}", section.key()),
            Self::TeamAvatar { index } => format!("team_section_avatar_{index}"),
            Self::MediaFile => "file".into(),
            Self::ProjectImage => "image_file".into(),
        }
    }

    /// Whether more than one file may be sent under this name.
    pub fn is_repeatable(&self) -> bool {
        matches!(self, Self::Images)
    }

    /// Parse a multipart field name back into a [`FileField`].
    pub fn from_form_name(name: &str) -> Option<Self> {
        match name {
            "image_files" => return Some(Self::Images),
            "og_image_file" => return Some(Self::OgImage),
            "hero_section_image_file" => return Some(Self::HeroSectionImage),
            "file" => return Some(Self::MediaFile),
            "image_file" => return Some(Self::ProjectImage),
            _ => {}
        }
        if let Some(index) = name.strip_prefix("team_section_avatar_") {
            return index.parse().ok().map(|index| Self::TeamAvatar { index });
        }
        SectionKind::ALL.into_iter().find_map(|section| {
            name.strip_prefix(&format!("{}_icon_", section.key()))
                .and_then(|index| index.parse().ok())
                .map(|index| Self::SectionIcon { section, index })
        })
    }
}

impl fmt::Display for FileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.form_name())
    }
}

/// A newly attached file blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub field: FileField,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(field: FileField, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).to_string();
        Self {
            field,
            file_name,
            content_type,
            bytes,
        }
    }
}

/// Guess a MIME type from a file extension. Unknown extensions are sent
/// as `application/octet-stream`.
pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "mp4" => "video/mp4",
        _ => "application/octet-stream",
    }
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Encode a JSON value as a multipart text value.
///
/// Strings are sent raw, booleans and numbers in their literal form, and
/// arrays / objects as JSON text (e.g. `sections_data`, `tag_ids`).
pub fn encode_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Ordered multipart body: text fields then files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormPayload {
    fields: Vec<(String, String)>,
    files: Vec<Attachment>,
}

impl FormPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from diff output plus new attachments.
    pub fn from_changes(changes: &[FieldChange], attachments: &[Attachment]) -> Self {
        let mut payload = Self::new();
        for change in changes {
            payload.push_value(&change.field, &change.value);
        }
        for attachment in attachments {
            payload.attach(attachment.clone());
        }
        payload
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn push_value(&mut self, name: &str, value: &Value) {
        self.fields.push((name.to_string(), encode_value(value)));
    }

    pub fn attach(&mut self, attachment: Attachment) {
        self.files.push(attachment);
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn files(&self) -> &[Attachment] {
        &self.files
    }

    /// Value of the first text field with this name.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Names of all text fields, in order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.files.is_empty()
    }

    pub fn into_parts(self) -> (Vec<(String, String)>, Vec<Attachment>) {
        (self.fields, self.files)
    }
}
