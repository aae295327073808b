//! Inbound event normalization.
//!
//! Two notification shapes carry work, a third is a liveness probe:
//!
//! ```text
//! direct   {"detail": {"bucket": {"name": ..}, "object": {"key": ..}}}
//! batch    {"Records": [{"s3": {"bucket": {"name": ..}, "object": {"key": ..}}}, ..]}
//! probe    {"test": true}
//! ```
//!
//! [`classify`] inspects the raw JSON value and names the shape;
//! [`normalize`] turns it into a flat list of [`WorkItem`]s. Keys in batch
//! records arrive URL-encoded (`+` for space, `%XX` escapes) and are decoded
//! here. Direct notifications carry keys verbatim.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// One candidate object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkItem {
    pub bucket: String,
    pub key: String,
}

impl WorkItem {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    #[error("invalid event structure (top-level keys: {received:?})")]
    InvalidShape { received: Vec<String> },
    #[error("object key {key:?} is not valid URL encoding")]
    UndecodableKey { key: String, received: Vec<String> },
}

impl EventError {
    /// Top-level keys of the rejected event, sorted.
    pub fn received(&self) -> &[String] {
        match self {
            EventError::InvalidShape { received } | EventError::UndecodableKey { received, .. } => {
                received
            }
        }
    }
}

/// Structural classification of a raw event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Direct(WorkItem),
    /// Keys are still URL-encoded.
    Batch(Vec<WorkItem>),
    Probe,
    Unrecognized { keys: Vec<String> },
}

/// Result of normalizing a recognized event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    Items(Vec<WorkItem>),
    Probe,
}

#[derive(Deserialize)]
struct BucketRef {
    name: String,
}

#[derive(Deserialize)]
struct ObjectRef {
    key: String,
}

#[derive(Deserialize)]
struct ObjectDescriptor {
    bucket: BucketRef,
    object: ObjectRef,
}

impl From<&ObjectDescriptor> for WorkItem {
    fn from(d: &ObjectDescriptor) -> Self {
        WorkItem::new(&d.bucket.name, &d.object.key)
    }
}

#[derive(Deserialize)]
struct DirectEnvelope {
    detail: ObjectDescriptor,
}

#[derive(Deserialize)]
struct Record {
    s3: ObjectDescriptor,
}

#[derive(Deserialize)]
struct BatchEnvelope {
    #[serde(rename = "Records")]
    records: Vec<Record>,
}

/// Sorted top-level keys of an event; empty when it is not an object.
pub fn top_level_keys(event: &Value) -> Vec<String> {
    let mut keys: Vec<String> = event
        .as_object()
        .map(|map| map.keys().cloned().collect())
        .unwrap_or_default();
    keys.sort();
    keys
}

/// Name the shape of a raw event.
///
/// Direct wins over batch, and a non-empty batch wins over probe. An empty
/// `Records` array only counts as a batch when the event is not a probe.
pub fn classify(event: &Value) -> InboundEvent {
    if let Ok(direct) = DirectEnvelope::deserialize(event) {
        return InboundEvent::Direct(WorkItem::from(&direct.detail));
    }
    let batch = BatchEnvelope::deserialize(event).ok();
    if let Some(batch) = batch.as_ref().filter(|b| !b.records.is_empty()) {
        return InboundEvent::Batch(batch.records.iter().map(|r| WorkItem::from(&r.s3)).collect());
    }
    if event.get("test") == Some(&Value::Bool(true)) {
        return InboundEvent::Probe;
    }
    match batch {
        Some(_) => InboundEvent::Batch(Vec::new()),
        None => InboundEvent::Unrecognized {
            keys: top_level_keys(event),
        },
    }
}

/// Decode a notification key: `+` is a space, then percent-decoding.
pub fn decode_key(raw: &str) -> Option<String> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced).ok().map(|key| key.into_owned())
}

/// Turn a raw event into work items, or explain why it was rejected.
pub fn normalize(event: &Value) -> Result<Normalized, EventError> {
    match classify(event) {
        InboundEvent::Direct(item) => Ok(Normalized::Items(vec![item])),
        InboundEvent::Batch(items) => items
            .into_iter()
            .map(|item| match decode_key(&item.key) {
                Some(key) => Ok(WorkItem { key, ..item }),
                None => Err(EventError::UndecodableKey {
                    key: item.key,
                    received: top_level_keys(event),
                }),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Normalized::Items),
        InboundEvent::Probe => Ok(Normalized::Probe),
        InboundEvent::Unrecognized { keys } => Err(EventError::InvalidShape { received: keys }),
    }
}
