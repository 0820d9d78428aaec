//! Wire types for the Valyu API.

mod answer;
mod contents;
mod datasources;
mod deepresearch;
mod search;

pub use answer::*;
pub use contents::*;
pub use datasources::*;
pub use deepresearch::*;
pub use search::*;

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// Flat string/number/bool metadata attached to tasks and batches.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// One metadata value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl From<&str> for MetadataValue {
    fn from(v: &str) -> Self {
        MetadataValue::Str(v.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(v: String) -> Self {
        MetadataValue::Str(v)
    }
}

impl From<i64> for MetadataValue {
    fn from(v: i64) -> Self {
        MetadataValue::Int(v)
    }
}

impl From<bool> for MetadataValue {
    fn from(v: bool) -> Self {
        MetadataValue::Bool(v)
    }
}

/// Response content length: a preset name or a character count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseLength {
    Short,
    Medium,
    Large,
    Max,
    Chars(u32),
}

impl Serialize for ResponseLength {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ResponseLength::Short => serializer.serialize_str("short"),
            ResponseLength::Medium => serializer.serialize_str("medium"),
            ResponseLength::Large => serializer.serialize_str("large"),
            ResponseLength::Max => serializer.serialize_str("max"),
            ResponseLength::Chars(n) => serializer.serialize_u32(*n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_length_serialization() {
        assert_eq!(serde_json::to_value(ResponseLength::Short).unwrap(), json!("short"));
        assert_eq!(
            serde_json::to_value(ResponseLength::Chars(25_000)).unwrap(),
            json!(25_000)
        );
    }

    #[test]
    fn test_metadata_value_round_trip() {
        let mut meta = Metadata::new();
        meta.insert("env".to_string(), "prod".into());
        meta.insert("attempt".to_string(), 3i64.into());
        meta.insert("notify".to_string(), true.into());

        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value, json!({"attempt": 3, "env": "prod", "notify": true}));

        let back: Metadata = serde_json::from_value(value).unwrap();
        assert_eq!(back, meta);
    }
}
