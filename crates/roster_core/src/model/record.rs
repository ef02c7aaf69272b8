//! Record domain model.
//!
//! # Responsibility
//! - Define the document shape shared by students and trainees.
//! - Keep caller-supplied fields intact next to the well-known ones.
//!
//! # Invariants
//! - `id` is assigned once and never reused for another record.
//! - `title` is the only sort key used by listing.
//! - Unknown fields round-trip unchanged through (de)serialization.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Stable identifier of a record inside its collection.
pub type RecordId = String;

/// Free-form fields carried by a record besides the well-known ones.
pub type Fields = Map<String, Value>;

/// One stored document (a student or a trainee).
///
/// Serialized flat: `id`, `title`, `imageUrl` and every extra field share one
/// JSON object, which is the shape the API accepts and returns.
///
/// A `title` or `imageUrl` that is not a string is kept verbatim in `fields`
/// and written back under its own key. For such records `title` holds the
/// value's JSON text so it still sorts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireRecord", into = "WireRecord")]
pub struct Record {
    /// Empty until the store assigns one on create.
    pub id: RecordId,
    /// Sort key for listing. Missing or `null` titles become `""`.
    pub title: String,
    /// Public URL of the uploaded image, if any.
    pub image_url: Option<String>,
    /// Everything else the caller sent.
    pub fields: Fields,
}

const TITLE_FIELD: &str = "title";
const IMAGE_URL_FIELD: &str = "imageUrl";

/// JSON shape of a `Record`, with the well-known fields left untyped.
#[derive(Serialize, Deserialize)]
struct WireRecord {
    #[serde(default)]
    id: RecordId,
    #[serde(default)]
    title: Value,
    #[serde(rename = "imageUrl", default, skip_serializing_if = "Option::is_none")]
    image_url: Option<Value>,
    #[serde(flatten)]
    fields: Fields,
}

impl From<WireRecord> for Record {
    fn from(wire: WireRecord) -> Self {
        let WireRecord {
            id,
            title,
            image_url,
            mut fields,
        } = wire;

        let title = match title {
            Value::String(text) => text,
            Value::Null => String::new(),
            other => {
                let key = other.to_string();
                fields.insert(TITLE_FIELD.to_string(), other);
                key
            }
        };
        let image_url = match image_url {
            Some(Value::String(url)) => Some(url),
            None | Some(Value::Null) => None,
            Some(other) => {
                fields.insert(IMAGE_URL_FIELD.to_string(), other);
                None
            }
        };

        Self {
            id,
            title,
            image_url,
            fields,
        }
    }
}

impl From<Record> for WireRecord {
    fn from(record: Record) -> Self {
        let Record {
            id,
            title,
            image_url,
            mut fields,
        } = record;

        let title = fields
            .remove(TITLE_FIELD)
            .unwrap_or(Value::String(title));
        let image_url = fields
            .remove(IMAGE_URL_FIELD)
            .or_else(|| image_url.map(Value::String));

        Self {
            id,
            title,
            image_url,
            fields,
        }
    }
}

impl Record {
    /// Creates an unsaved record with the given title and no id.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Builder-style helper to attach one free-form field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Returns whether the record already carries an id.
    pub fn has_id(&self) -> bool {
        !self.id.trim().is_empty()
    }

    /// Looks up a free-form field as text.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

/// Generates a fresh record id.
///
/// Uses the hyphen-less UUID form so ids stay URL-path friendly.
pub fn generate_record_id() -> RecordId {
    Uuid::new_v4().simple().to_string()
}
