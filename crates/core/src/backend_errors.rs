//! Interpretation of backend error bodies for user-facing reporting.
//!
//! The backend answers failed writes with one of:
//!
//! - `{"detail": "..."}`, `{"error": "..."}` or `{"message": "..."}`
//! - a field map, `{"slug": ["blog with this slug already exists."]}`
//! - something else entirely (HTML error page, empty body)
//!
//! Known field names are mapped to the form tab that holds them so the
//! editor can focus the input. Anything unrecognized collapses into a
//! generic message.

use serde::Serialize;
use serde_json::Value;

use crate::validation::FormTab;

pub const GENERIC_SAVE_ERROR: &str = "Something went wrong while saving. Please try again.";

/// Fields checked first, in the same priority as client-side validation.
const FIELD_PRIORITY: &[&str] = &[
    "title",
    "slug",
    "content",
    "description",
    "meta_title",
    "meta_description",
    "sections_data",
];

/// What the form should show for a failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendErrorReport {
    pub message: String,
    /// Field to focus, when the error names one the form knows.
    pub field: Option<String>,
    pub tab: Option<FormTab>,
}

impl BackendErrorReport {
    pub fn generic() -> Self {
        Self::message(GENERIC_SAVE_ERROR)
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: None,
            tab: None,
        }
    }
}

/// Interpret a raw response body.
pub fn interpret(body: &str) -> BackendErrorReport {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => interpret_value(&value),
        Err(_) => BackendErrorReport::generic(),
    }
}

/// Interpret an already-parsed JSON body.
pub fn interpret_value(value: &Value) -> BackendErrorReport {
    let Some(map) = value.as_object() else {
        return BackendErrorReport::generic();
    };

    for key in ["detail", "error", "message"] {
        if let Some(text) = map.get(key).and_then(first_message) {
            return BackendErrorReport::message(text);
        }
    }

    let known = FIELD_PRIORITY
        .iter()
        .map(|f| f.to_string())
        .chain(map.keys().cloned())
        .find(|field| map.contains_key(field) && FormTab::for_field(field).is_some());

    match known {
        Some(field) => {
            let message = map
                .get(&field)
                .and_then(first_message)
                .unwrap_or_else(|| GENERIC_SAVE_ERROR.to_string());
            BackendErrorReport {
                message,
                tab: FormTab::for_field(&field),
                field: Some(field),
            }
        }
        None => BackendErrorReport::generic(),
    }
}

/// First human-readable string in a string, list, or nested object.
fn first_message(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(first_message),
        Value::Object(map) => map.values().find_map(first_message),
        _ => None,
    }
}
