use std::fmt;

use serde::{Deserialize, Serialize};

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Identifier of a backend record.
///
/// Most endpoints use integer primary keys, a few return string ids. The
/// value is carried verbatim and rendered with [`Display`](fmt::Display)
/// when building detail URLs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Str(String),
}

impl Default for RecordId {
    fn default() -> Self {
        RecordId::Int(0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(id) => write!(f, "{id}"),
            RecordId::Str(id) => f.write_str(id),
        }
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId::Int(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        match id.parse::<i64>() {
            Ok(n) => RecordId::Int(n),
            Err(_) => RecordId::Str(id.to_string()),
        }
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        RecordId::from(id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_strings_become_int_ids() {
        assert_eq!(RecordId::from("42"), RecordId::Int(42));
        assert_eq!(RecordId::from("abc-1"), RecordId::Str("abc-1".into()));
    }

    #[test]
    fn deserializes_both_shapes() {
        let int: RecordId = serde_json::from_str("7").unwrap();
        let text: RecordId = serde_json::from_str("\"x7\"").unwrap();
        assert_eq!(int, RecordId::Int(7));
        assert_eq!(text.to_string(), "x7");
    }
}
