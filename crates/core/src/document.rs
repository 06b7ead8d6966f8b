//! The stored record model.
//!
//! A [`Document`] splits a stored record into the fields the normalizer manages (`id`,
//! `created_at`, `updated_at`) and an open bag of business fields. Unknown fields pass through
//! untouched, including the storage-internal identifier until the normalizer strips it.
//!
//! ## Timestamp normalisation
//! Timestamps are read leniently and always written as RFC 3339 UTC. Accepted inputs:
//! - RFC 3339 with any offset (`2025-08-01T10:00:00+01:00`)
//! - ISO 8601 with a colon-less offset (`2025-08-01T10:00:00.123+0000`)
//! - Naive ISO 8601, taken as UTC (`2025-08-01T10:00:00.123456`, `2025-08-01 10:00:00`)
//! - Integer epochs: seconds below [`EPOCH_MILLIS_THRESHOLD`], milliseconds from it upwards
//! - Extended-JSON dates (`{"$date": "2025-08-01T10:00:00Z"}`, `{"$date": 1754042400000}` or
//!   `{"$date": {"$numberLong": "1754042400000"}}`), always in milliseconds
//!
//! A managed timestamp in any other shape is not an error: it stays in the business fields
//! under its own key, exactly as read, and the typed slot stays empty.

use crate::constants::{CREATED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD};
use crate::{CoreError, CoreResult, ValidationError};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Bare integer epochs at or above this are milliseconds, below it seconds.
///
/// `10^11` seconds is past the year 5000, while `10^11` milliseconds is March 1973.
pub const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// One persisted business entity.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    id: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    fields: Map<String, Value>,
}

impl Document {
    /// An empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a document from a JSON object, lifting the managed fields out of the map.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotAnObject`] for non-object values, and a [`ValidationError`] if
    /// `id` is not a string.
    pub fn from_value(value: Value) -> CoreResult<Self> {
        match value {
            Value::Object(map) => Self::from_map(map),
            other => Err(CoreError::NotAnObject(json_kind(&other))),
        }
    }

    /// Builds a document from a JSON map, lifting the managed fields out of the map.
    pub fn from_map(map: Map<String, Value>) -> CoreResult<Self> {
        let mut doc = Self::new();
        for (key, value) in map {
            doc.insert(key, value)?;
        }
        Ok(doc)
    }

    /// Converts the document back into a JSON value.
    pub fn into_value(self) -> Value {
        let mut map = self.fields;
        if let Some(id) = self.id {
            map.insert(ID_FIELD.to_string(), Value::String(id));
        }
        if let Some(ts) = self.created_at {
            map.insert(CREATED_AT_FIELD.to_string(), Value::String(format_timestamp(ts)));
        }
        if let Some(ts) = self.updated_at {
            map.insert(UPDATED_AT_FIELD.to_string(), Value::String(format_timestamp(ts)));
        }
        Value::Object(map)
    }

    /// Sets a field. Managed fields are routed to their typed slots.
    ///
    /// A `null` managed field clears it. A timestamp that cannot be read is kept verbatim as a
    /// business field and logged.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Malformed`] if `id` is neither a string nor `null`. Nothing
    /// else is rejected.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> CoreResult<()> {
        let key = key.into();
        match key.as_str() {
            ID_FIELD => {
                self.id = match value {
                    Value::Null => None,
                    Value::String(s) => Some(s),
                    other => {
                        return Err(ValidationError::malformed(ID_FIELD, other.to_string()).into())
                    }
                };
            }
            CREATED_AT_FIELD | UPDATED_AT_FIELD => self.insert_timestamp(key, value),
            _ => {
                self.fields.insert(key, value);
            }
        }
        Ok(())
    }

    /// Builder form of [`Document::insert`] for business fields.
    ///
    /// # Errors
    ///
    /// Same as [`Document::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> CoreResult<Self> {
        self.insert(key, value.into())?;
        Ok(self)
    }

    /// Returns a business field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Removes a business field.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    /// The business fields, excluding the managed ones.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    fn insert_timestamp(&mut self, key: String, value: Value) {
        let parsed = parse_timestamp_value(&value);
        let slot = if key == CREATED_AT_FIELD {
            &mut self.created_at
        } else {
            &mut self.updated_at
        };

        match parsed {
            Some(ts) => {
                *slot = ts;
                self.fields.remove(&key);
            }
            None => {
                *slot = None;
                tracing::warn!(field = %key, value = %value, "unreadable timestamp kept as-is");
                self.fields.insert(key, value);
            }
        }
    }

    pub(crate) fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    /// Clears an empty-string `id` so it is treated the same as an absent one.
    pub(crate) fn clear_blank_id(&mut self) {
        if self.id.as_deref().is_some_and(str::is_empty) {
            self.id = None;
        }
    }

    /// Sets `created_at` if absent and `updated_at` always, replacing any unreadable raw values.
    pub(crate) fn stamp(&mut self, now: DateTime<Utc>) {
        if self.created_at.is_none() {
            self.created_at = Some(now);
            self.fields.remove(CREATED_AT_FIELD);
        }
        self.updated_at = Some(now);
        self.fields.remove(UPDATED_AT_FIELD);
    }

    /// True if the document has no managed and no business fields.
    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.created_at.is_none()
            && self.updated_at.is_none()
            && self.fields.is_empty()
    }
}

impl Serialize for Document {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        if let Some(id) = &self.id {
            map.serialize_entry(ID_FIELD, id)?;
        }
        if let Some(ts) = self.created_at {
            map.serialize_entry(CREATED_AT_FIELD, &format_timestamp(ts))?;
        }
        if let Some(ts) = self.updated_at {
            map.serialize_entry(UPDATED_AT_FIELD, &format_timestamp(ts))?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        Document::from_map(map).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<Value> for Document {
    type Error = CoreError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Document::from_value(value)
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        doc.into_value()
    }
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true)
}

/// Reads a managed timestamp value. `Some(None)` is an explicit `null`, `None` is unreadable.
fn parse_timestamp_value(value: &Value) -> Option<Option<DateTime<Utc>>> {
    match value {
        Value::Null => Some(None),
        Value::String(s) => parse_timestamp(s).map(Some),
        Value::Number(n) => n.as_i64().and_then(from_epoch).map(Some),
        Value::Object(map) => match map.get("$date")? {
            Value::String(s) => parse_timestamp(s).map(Some),
            Value::Number(n) => n
                .as_i64()
                .and_then(DateTime::from_timestamp_millis)
                .map(Some),
            Value::Object(long) => match long.get("$numberLong")? {
                Value::String(s) => s
                    .trim()
                    .parse::<i64>()
                    .ok()
                    .and_then(DateTime::from_timestamp_millis)
                    .map(Some),
                _ => None,
            },
            _ => None,
        },
        _ => None,
    }
}

fn from_epoch(n: i64) -> Option<DateTime<Utc>> {
    if n.unsigned_abs() < EPOCH_MILLIS_THRESHOLD.unsigned_abs() {
        DateTime::from_timestamp(n, 0)
    } else {
        DateTime::from_timestamp_millis(n)
    }
}

/// Parses an ISO 8601 timestamp into UTC. Timestamps without an offset are taken as UTC.
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Some(ts.with_timezone(&Utc));
    }

    if let Some(ts) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(input, fmt).ok())
    {
        return Some(ts.with_timezone(&Utc));
    }

    NAIVE_FORMATS.iter().find_map(|fmt| {
        NaiveDateTime::parse_from_str(input, fmt)
            .ok()
            .map(|naive| DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
