//! Invocation entry point.
//!
//! [`handle_event`] takes one raw event and drives every work item through
//! the pipeline, strictly in order:
//!
//! ```text
//! key checks ─► fetch ─► content-type check ─► decode ─► render (fan-out) ─► write (fan-out)
//!     │                        │
//!     └── skip ◄───────────────┘
//! ```
//!
//! Ineligible items are skipped and reported in the response. A malformed
//! event becomes a 400 response. Every other failure (fetch, decode, render,
//! write) aborts the invocation and is returned as a [`HandlerError`], leaving
//! redelivery to whatever invoked the handler. Writes already issued for the
//! failing item are not rolled back.

use crate::event::{self, EventError, Normalized, WorkItem};
use crate::imaging::{CodecError, ImageCodec, render_variants};
use crate::plan::{PlanOptions, SkipReason, check_content_type, check_key, plan_variants};
use crate::storage::{ObjectStore, StorageError};
use crate::writer::write_variants;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

pub const PROBE_MESSAGE: &str = "Test event received";
pub const EMPTY_MESSAGE: &str = "No records to process";
pub const COMPLETE_MESSAGE: &str = "Processing complete";
pub const INVALID_EVENT_ERROR: &str = "Invalid event structure";

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("failed to fetch {key}: {source}")]
    Fetch {
        key: String,
        #[source]
        source: StorageError,
    },
    #[error("failed to process {key}: {source}")]
    Codec {
        key: String,
        #[source]
        source: CodecError,
    },
    #[error("failed to write variants of {key}: {source}")]
    Write {
        key: String,
        #[source]
        source: StorageError,
    },
}

impl HandlerError {
    /// Source key of the work item that failed.
    pub fn key(&self) -> &str {
        match self {
            Self::Fetch { key, .. } | Self::Codec { key, .. } | Self::Write { key, .. } => key,
        }
    }
}

/// What happened to one work item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingOutcome {
    pub key: String,
    pub succeeded: bool,
    pub variants_written: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessingOutcome {
    pub fn written(key: &str, variants_written: Vec<String>) -> Self {
        Self {
            key: key.to_string(),
            succeeded: true,
            variants_written,
            skipped: None,
            error: None,
        }
    }

    pub fn skipped(key: &str, reason: &SkipReason) -> Self {
        Self {
            key: key.to_string(),
            succeeded: true,
            variants_written: Vec::new(),
            skipped: Some(reason.to_string()),
            error: None,
        }
    }

    pub fn failed(error: &HandlerError) -> Self {
        Self {
            key: error.key().to_string(),
            succeeded: false,
            variants_written: Vec::new(),
            skipped: None,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Message {
        message: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        results: Vec<ProcessingOutcome>,
    },
    Error {
        error: String,
        received: Vec<String>,
    },
}

/// HTTP-style invocation result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: ResponseBody,
}

impl Response {
    pub fn message(message: &str, results: Vec<ProcessingOutcome>) -> Self {
        Self {
            status_code: 200,
            body: ResponseBody::Message {
                message: message.to_string(),
                results,
            },
        }
    }

    pub fn invalid_event(error: &EventError) -> Self {
        Self {
            status_code: 400,
            body: ResponseBody::Error {
                error: INVALID_EVENT_ERROR.to_string(),
                received: error.received().to_vec(),
            },
        }
    }

    /// Per-item outcomes, empty for probes and rejected events.
    pub fn results(&self) -> &[ProcessingOutcome] {
        match &self.body {
            ResponseBody::Message { results, .. } => results,
            ResponseBody::Error { .. } => &[],
        }
    }
}

/// Handle one invocation.
pub fn handle_event(
    codec: &impl ImageCodec,
    store: &impl ObjectStore,
    options: &PlanOptions,
    event: &serde_json::Value,
) -> Result<Response, HandlerError> {
    let items = match event::normalize(event) {
        Ok(Normalized::Items(items)) => items,
        Ok(Normalized::Probe) => {
            tracing::info!("probe event received");
            return Ok(Response::message(PROBE_MESSAGE, Vec::new()));
        }
        Err(e) => {
            tracing::warn!(error = %e, received = ?e.received(), "rejected event");
            return Ok(Response::invalid_event(&e));
        }
    };

    if items.is_empty() {
        tracing::info!("event carried no records");
        return Ok(Response::message(EMPTY_MESSAGE, Vec::new()));
    }

    tracing::info!(items = items.len(), "processing event");
    let mut results = Vec::with_capacity(items.len());
    for item in &items {
        results.push(process_item(codec, store, options, item, Utc::now())?);
    }
    Ok(Response::message(COMPLETE_MESSAGE, results))
}

/// Run one work item through the pipeline.
///
/// Key checks run before the fetch so ineligible keys cost no storage call.
pub fn process_item<C: ImageCodec>(
    codec: &C,
    store: &impl ObjectStore,
    options: &PlanOptions,
    item: &WorkItem,
    processed_at: DateTime<Utc>,
) -> Result<ProcessingOutcome, HandlerError> {
    let skip = |reason: SkipReason| {
        tracing::info!(bucket = %item.bucket, key = %item.key, %reason, "skipping object");
        ProcessingOutcome::skipped(&item.key, &reason)
    };

    let source = match check_key(&item.key, options) {
        Ok(source) => source,
        Err(reason) => return Ok(skip(reason)),
    };

    let object = store
        .get(&item.bucket, &item.key)
        .map_err(|source| HandlerError::Fetch {
            key: item.key.clone(),
            source,
        })?;

    if let Err(reason) = check_content_type(object.content_type.as_deref()) {
        return Ok(skip(reason));
    }

    let codec_error = |source| HandlerError::Codec {
        key: item.key.clone(),
        source,
    };
    let image = codec.decode(&object.bytes).map_err(codec_error)?;
    let specs = plan_variants(&source, options);
    let variants = render_variants(codec, &image, &specs).map_err(codec_error)?;

    let written = write_variants(
        store,
        &item.bucket,
        &variants,
        object.bytes.len(),
        processed_at,
    )
    .map_err(|source| HandlerError::Write {
        key: item.key.clone(),
        source,
    })?;

    tracing::info!(
        bucket = %item.bucket,
        key = %item.key,
        variants = written.len(),
        original_bytes = object.bytes.len(),
        "processed object"
    );
    Ok(ProcessingOutcome::written(&item.key, written))
}
