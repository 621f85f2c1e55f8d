//! Remote record model and the arrangement <-> record mapping.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::arrangement::{Arrangement, ArrangementId, ArrangementParts, WindowRecord};

use super::errors::RemoteError;

pub const ARRANGEMENT_RECORD_TYPE: &str = "WindowArrangement";

pub const FIELD_NAME: &str = "name";
pub const FIELD_CREATED_AT: &str = "createdAt";
pub const FIELD_UPDATED_AT: &str = "updatedAt";
pub const FIELD_ORIGIN_DEVICE: &str = "originDevice";
pub const FIELD_TAGS: &str = "tags";
pub const FIELD_WINDOWS: &str = "windows";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<ArrangementId> for RecordId {
    fn from(id: ArrangementId) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Timestamp(DateTime<Utc>),
    TextList(Vec<String>),
    Bytes(#[serde(with = "base64_bytes")] Vec<u8>),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Timestamp(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::TextList(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            FieldValue::Bytes(value) => Some(value),
            _ => None,
        }
    }

    /// Order between values of the same kind; mixed kinds are unordered.
    fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => Some(a.cmp(b)),
            (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteRecord {
    pub id: RecordId,
    pub record_type: String,
    pub fields: BTreeMap<String, FieldValue>,
}

impl RemoteRecord {
    pub fn new(id: RecordId, record_type: impl Into<String>) -> Self {
        Self {
            id,
            record_type: record_type.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, key: &str, value: FieldValue) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }
}

/// Record filter for `RemoteStore::query`.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    All,
    Equals { field: String, value: FieldValue },
}

impl Predicate {
    pub fn matches(&self, record: &RemoteRecord) -> bool {
        match self {
            Predicate::All => true,
            Predicate::Equals { field, value } => record.field(field) == Some(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortDescriptor {
    pub field: String,
    pub ascending: bool,
}

impl SortDescriptor {
    pub fn ascending(field: &str) -> Self {
        Self {
            field: field.to_string(),
            ascending: true,
        }
    }

    pub fn descending(field: &str) -> Self {
        Self {
            field: field.to_string(),
            ascending: false,
        }
    }

    /// Records missing the field, or holding an incomparable value, sort last
    /// in either direction.
    pub fn compare(&self, a: &RemoteRecord, b: &RemoteRecord) -> Ordering {
        match (a.field(&self.field), b.field(&self.field)) {
            (Some(x), Some(y)) => match x.compare(y) {
                Some(ordering) if self.ascending => ordering,
                Some(ordering) => ordering.reverse(),
                None => Ordering::Equal,
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl Arrangement {
    /// The remote record for this arrangement, keyed by its id.
    pub fn to_record(&self) -> Result<RemoteRecord, RemoteError> {
        let windows = serde_json::to_vec(self.windows()).map_err(|e| RemoteError::EncodeFailed {
            message: e.to_string(),
        })?;

        Ok(RemoteRecord::new(RecordId::from(self.id()), ARRANGEMENT_RECORD_TYPE)
            .with_field(FIELD_NAME, FieldValue::Text(self.name().to_string()))
            .with_field(FIELD_CREATED_AT, FieldValue::Timestamp(self.created_at()))
            .with_field(FIELD_UPDATED_AT, FieldValue::Timestamp(self.updated_at()))
            .with_field(
                FIELD_ORIGIN_DEVICE,
                FieldValue::Text(self.origin_device().to_string()),
            )
            .with_field(FIELD_TAGS, FieldValue::TextList(self.tags().to_vec()))
            .with_field(FIELD_WINDOWS, FieldValue::Bytes(windows)))
    }

    /// Rebuild an arrangement from a remote record.
    ///
    /// Every field must be present with the expected kind; anything missing
    /// or malformed rejects the whole record.
    pub fn from_record(record: &RemoteRecord) -> Result<Arrangement, RemoteError> {
        let fail = |reason: String| RemoteError::DecodeFailed {
            id: record.id.to_string(),
            reason,
        };

        if record.record_type != ARRANGEMENT_RECORD_TYPE {
            return Err(fail(format!(
                "unexpected record type '{}'",
                record.record_type
            )));
        }

        let id = record
            .id
            .as_str()
            .parse::<ArrangementId>()
            .map_err(|e| fail(e.to_string()))?;
        let name = required(record, FIELD_NAME, FieldValue::as_text).map_err(&fail)?;
        let created_at =
            required(record, FIELD_CREATED_AT, FieldValue::as_timestamp).map_err(&fail)?;
        let updated_at =
            required(record, FIELD_UPDATED_AT, FieldValue::as_timestamp).map_err(&fail)?;
        let origin_device =
            required(record, FIELD_ORIGIN_DEVICE, FieldValue::as_text).map_err(&fail)?;
        let tags = required(record, FIELD_TAGS, FieldValue::as_text_list).map_err(&fail)?;
        let window_bytes = required(record, FIELD_WINDOWS, FieldValue::as_bytes).map_err(&fail)?;
        let windows: Vec<WindowRecord> = serde_json::from_slice(window_bytes)
            .map_err(|e| fail(format!("windows: {}", e)))?;

        Arrangement::from_parts(ArrangementParts {
            id,
            name: name.to_string(),
            windows,
            created_at,
            updated_at,
            origin_device: origin_device.to_string(),
            tags: tags.to_vec(),
        })
        .map_err(|e| fail(e.to_string()))
    }
}

fn required<'a, T>(
    record: &'a RemoteRecord,
    key: &str,
    extract: impl Fn(&'a FieldValue) -> Option<T>,
) -> Result<T, String> {
    let value = record
        .field(key)
        .ok_or_else(|| format!("missing field '{}'", key))?;
    extract(value).ok_or_else(|| format!("field '{}' has the wrong type", key))
}
