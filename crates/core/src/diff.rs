//! Field-level diff between a draft and the record it was seeded from.
//!
//! Values are compared structurally as [`serde_json::Value`]s, so nested
//! objects such as `sections_data` count as changed when any leaf differs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::EditableRecord;

/// The status of a field in a diff comparison.
///
/// - `Added`     -- present only in the current side.
/// - `Removed`   -- present only in the original side.
/// - `Changed`   -- present in both sides with different values.
/// - `Unchanged` -- present in both sides with identical values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffStatus {
    Added,
    Removed,
    Changed,
    Unchanged,
}

impl DiffStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Changed => "changed",
            Self::Unchanged => "unchanged",
        }
    }
}

impl std::fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One differing field. `value` is the current value (`Null` when removed).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    pub field: String,
    pub status: DiffStatus,
    pub value: Value,
}

/// Compare two field maps key by key.
///
/// Only non-`Unchanged` entries are returned, sorted by field name.
pub fn diff_fields(original: &Map<String, Value>, current: &Map<String, Value>) -> Vec<FieldChange> {
    let mut changes = Vec::new();

    for (field, value) in current {
        let status = match original.get(field) {
            None => DiffStatus::Added,
            Some(old) if old == value => DiffStatus::Unchanged,
            Some(_) => DiffStatus::Changed,
        };
        if status != DiffStatus::Unchanged {
            changes.push(FieldChange {
                field: field.clone(),
                status,
                value: value.clone(),
            });
        }
    }

    for field in original.keys() {
        if !current.contains_key(field) {
            changes.push(FieldChange {
                field: field.clone(),
                status: DiffStatus::Removed,
                value: Value::Null,
            });
        }
    }

    changes.sort_by(|a, b| a.field.cmp(&b.field));
    changes
}

/// Diff the form projections of two records.
pub fn diff_records<R: EditableRecord>(original: &R, current: &R) -> Vec<FieldChange> {
    diff_fields(&original.form_fields(), &current.form_fields())
}
