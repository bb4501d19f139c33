//! Form-local draft of a record.
//!
//! A [`Draft`] is seeded from the fetched record (or a blank one when
//! creating), collects edits and newly attached files, and tracks one
//! error message per field. It is owned by a single form session and
//! never shared.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::diff::{diff_records, FieldChange};
use crate::error::CoreError;
use crate::models::EditableRecord;
use crate::payload::{Attachment, FileField, FormPayload};
use crate::validation::{RuleResult, ValidationFailure};

#[derive(Debug, Clone)]
pub struct Draft<R: EditableRecord> {
    original: R,
    current: R,
    attachments: Vec<Attachment>,
    errors: BTreeMap<String, String>,
}

impl<R: EditableRecord> Draft<R> {
    /// Seed a draft from a loaded record.
    pub fn new(record: R) -> Self {
        Self {
            original: record.clone(),
            current: record,
            attachments: Vec::new(),
            errors: BTreeMap::new(),
        }
    }

    /// Draft for a record that does not exist yet. Every filled field
    /// diffs against the blank record.
    pub fn blank() -> Self {
        Self::new(R::default())
    }

    pub fn original(&self) -> &R {
        &self.original
    }

    pub fn current(&self) -> &R {
        &self.current
    }

    pub fn into_current(self) -> R {
        self.current
    }

    // -- editing -------------------------------------------------------------

    /// Apply an edit to `field` and clear any error recorded for it.
    pub fn edit(&mut self, field: &str, f: impl FnOnce(&mut R)) {
        f(&mut self.current);
        self.errors.remove(field);
    }

    /// Set a value by dotted path (`title`,
    /// `sections_data.team_section.sub_sections.0.name`).
    ///
    /// Numeric segments index arrays; an index equal to the array length
    /// appends. Missing objects along the path are created. The top-level
    /// key must be a form field and the value must deserialize into the
    /// record type.
    pub fn set_field(&mut self, path: &str, value: Value) -> Result<(), CoreError> {
        let segments: Vec<&str> = path.split('.').collect();
        let top = segments
            .first()
            .copied()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| CoreError::Validation("Field path must not be empty".into()))?;
        if R::READ_ONLY_FIELDS.contains(&top) {
            return Err(CoreError::Validation(format!(
                "{top} is managed by the server and cannot be edited"
            )));
        }

        let mut root = serde_json::to_value(&self.current)
            .map_err(|e| CoreError::Internal(format!("Failed to serialize draft: {e}")))?;
        set_path(&mut root, &segments, value)?;
        let updated: R = serde_json::from_value(root)
            .map_err(|e| CoreError::Validation(format!("Invalid value for {path}: {e}")))?;
        // Optional fields drop out of the projection while unset.
        if !self.current.form_fields().contains_key(top)
            && !updated.form_fields().contains_key(top)
        {
            return Err(CoreError::Validation(format!(
                "{top} is not a field of the {} form",
                R::ENTITY
            )));
        }

        self.edit(path, |current| *current = updated);
        Ok(())
    }

    /// Attach a new file. Single-file fields replace any earlier attachment.
    pub fn attach(&mut self, attachment: Attachment) {
        if !attachment.field.is_repeatable() {
            self.attachments.retain(|a| a.field != attachment.field);
        }
        self.errors.remove(&attachment.field.form_name());
        self.attachments.push(attachment);
    }

    /// Drop every attachment for `field`.
    pub fn detach(&mut self, field: &FileField) {
        self.attachments.retain(|a| &a.field != field);
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    // -- errors --------------------------------------------------------------

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn error_for(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn set_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.insert(field.into(), message.into());
    }

    pub fn record_failure(&mut self, failure: &ValidationFailure) {
        self.set_error(failure.field.clone(), failure.message.clone());
    }

    // -- validation / diff ---------------------------------------------------

    pub fn validate(&self) -> RuleResult {
        self.current.validate()
    }

    pub fn changes(&self) -> Vec<FieldChange> {
        diff_records(&self.original, &self.current)
    }

    pub fn has_changes(&self) -> bool {
        !self.attachments.is_empty() || !self.changes().is_empty()
    }

    /// Changed fields plus new files, or `None` when there is nothing to
    /// send.
    pub fn build_payload(&self) -> Option<FormPayload> {
        let payload = FormPayload::from_changes(&self.changes(), &self.attachments);
        if payload.is_empty() {
            None
        } else {
            Some(payload)
        }
    }
}

fn set_path(target: &mut Value, segments: &[&str], value: Value) -> Result<(), CoreError> {
    let Some((head, rest)) = segments.split_first() else {
        *target = value;
        return Ok(());
    };

    if target.is_null() {
        *target = Value::Object(Default::default());
    }

    match target {
        Value::Object(map) => {
            let slot = map.entry(head.to_string()).or_insert(Value::Null);
            set_path(slot, rest, value)
        }
        Value::Array(items) => {
            let index: usize = head
                .parse()
                .map_err(|_| CoreError::Validation(format!("Expected a list index, got '{head}'")))?;
            if index == items.len() {
                items.push(Value::Null);
            }
            let slot = items.get_mut(index).ok_or_else(|| {
                CoreError::Validation(format!("List index {index} is out of range"))
            })?;
            set_path(slot, rest, value)
        }
        _ => Err(CoreError::Validation(format!(
            "Cannot set '{head}' on a non-object value"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Blog;
    use crate::payload::FileField;
    use crate::types::RecordId;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn loaded() -> Blog {
        Blog {
            id: RecordId::Int(5),
            title: "Draft post".into(),
            slug: "draft-post".into(),
            content: "Body".into(),
            meta_title: "Meta".into(),
            meta_description: "Desc".into(),
            published: false,
            ..Default::default()
        }
    }

    #[test]
    fn untouched_draft_has_empty_diff() {
        let draft = Draft::new(loaded());
        assert!(!draft.has_changes());
        assert!(draft.build_payload().is_none());
    }

    #[test]
    fn publishing_sends_exactly_one_field() {
        let mut draft = Draft::new(loaded());
        draft.edit("published", |b| b.published = true);

        let payload = draft.build_payload().unwrap();
        assert_eq!(payload.field_names(), vec!["published"]);
        assert_eq!(payload.field("published"), Some("true"));
        assert!(payload.files().is_empty());
    }

    #[test]
    fn reverting_an_edit_clears_the_diff() {
        let mut draft = Draft::new(loaded());
        draft.edit("title", |b| b.title = "Other".into());
        draft.edit("title", |b| b.title = "Draft post".into());
        assert!(draft.build_payload().is_none());
    }

    #[test]
    fn new_file_alone_is_a_change() {
        let mut draft = Draft::new(loaded());
        draft.attach(Attachment::new(FileField::OgImage, "og.jpg", vec![0xff]));
        let payload = draft.build_payload().unwrap();
        assert!(payload.fields().is_empty());
        assert_eq!(payload.files().len(), 1);
    }

    #[test]
    fn single_file_fields_are_replaced_but_gallery_accumulates() {
        let mut draft = Draft::new(loaded());
        draft.attach(Attachment::new(FileField::OgImage, "a.png", vec![1]));
        draft.attach(Attachment::new(FileField::OgImage, "b.png", vec![2]));
        draft.attach(Attachment::new(FileField::Images, "c.png", vec![3]));
        draft.attach(Attachment::new(FileField::Images, "d.png", vec![4]));
        assert_eq!(draft.attachments().len(), 3);
        assert_eq!(draft.attachments()[0].file_name, "b.png");

        draft.detach(&FileField::Images);
        assert_eq!(draft.attachments().len(), 1);
    }

    #[test]
    fn editing_a_field_clears_its_error_only() {
        let mut draft = Draft::new(loaded());
        draft.set_error("title", "bad");
        draft.set_error("slug", "bad");
        draft.edit("title", |b| b.title = "Fixed".into());
        assert_eq!(draft.error_for("title"), None);
        assert_eq!(draft.error_for("slug"), Some("bad"));
    }

    #[test]
    fn set_field_by_path_creates_nested_sections() {
        let mut draft = Draft::new(loaded());
        draft
            .set_field("sections_data.team_section.title", json!("Team"))
            .unwrap();
        draft
            .set_field("sections_data.team_section.sub_sections.0", json!({ "name": "Ada" }))
            .unwrap();

        let team = draft
            .current()
            .sections_data
            .as_ref()
            .and_then(|s| s.team_section.as_ref())
            .unwrap();
        assert_eq!(team.title, "Team");
        assert_eq!(team.sub_sections[0].name, "Ada");

        let changes = draft.changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, "sections_data");
    }

    #[test]
    fn set_field_rejects_read_only_and_mistyped_values() {
        let mut draft = Draft::new(loaded());
        assert_matches!(draft.set_field("id", json!(9)), Err(CoreError::Validation(_)));
        assert_matches!(
            draft.set_field("published", json!("yes")),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            draft.set_field("sections_data.quote_section.sub_sections.4", json!({})),
            Err(CoreError::Validation(_))
        );
        assert!(!draft.has_changes());
    }

    #[test]
    fn set_field_rejects_unknown_fields() {
        let mut draft = Draft::new(loaded());
        let err = draft.set_field("titel", json!("typo")).unwrap_err();
        assert_matches!(err, CoreError::Validation(ref msg) if msg.contains("titel"));
        assert_matches!(
            draft.set_field("titel.nested", json!(1)),
            Err(CoreError::Validation(_))
        );
        assert!(!draft.has_changes());
    }

    #[test]
    fn tag_ids_are_editable_and_submitted() {
        let mut blog = loaded();
        blog.tags = vec![crate::models::Tag {
            id: RecordId::Int(1),
            name: "Rust".into(),
            slug: "rust".into(),
        }];
        let mut draft = Draft::new(blog);

        draft.set_field("tag_ids", json!([1, 2])).unwrap();
        assert_eq!(
            draft.current().tag_ids,
            Some(vec![RecordId::Int(1), RecordId::Int(2)])
        );

        let payload = draft.build_payload().unwrap();
        assert_eq!(payload.field_names(), vec!["tag_ids"]);
        assert_eq!(payload.field("tag_ids"), Some("[1,2]"));
    }

    #[test]
    fn setting_the_loaded_tags_again_is_not_a_change() {
        let mut blog = loaded();
        blog.tags = vec![crate::models::Tag {
            id: RecordId::Int(1),
            name: "Rust".into(),
            slug: "rust".into(),
        }];
        let mut draft = Draft::new(blog);
        draft.set_field("tag_ids", json!([1])).unwrap();
        assert!(draft.build_payload().is_none());
    }
}
