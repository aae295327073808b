//! Object store interface.
//!
//! The pipeline needs exactly two calls from a store: fetch an object with
//! its declared content-type, and write one with content-type, cache-control
//! and optional user metadata. [`ObjectStore`] captures that; [`FsStore`]
//! implements it over a local directory tree.
//!
//! Stores are `Sync` because variant writes for one source are issued
//! concurrently from the rayon pool.

pub mod fs;

pub use fs::FsStore;

use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("object not found: s3://{bucket}/{key}")]
    NotFound { bucket: String, key: String },
    #[error("access denied to s3://{bucket}/{key}: {reason}")]
    AccessDenied {
        bucket: String,
        key: String,
        reason: String,
    },
    #[error("failed to read s3://{bucket}/{key}: {source}")]
    Read {
        bucket: String,
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write s3://{bucket}/{key}: {source}")]
    Write {
        bucket: String,
        key: String,
        #[source]
        source: std::io::Error,
    },
}

/// A fetched object.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    /// Declared content-type, if the store recorded one.
    pub content_type: Option<String>,
}

/// Everything needed to write one object.
#[derive(Debug, Clone, PartialEq)]
pub struct PutRequest {
    pub key: String,
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub cache_control: String,
    pub metadata: BTreeMap<String, String>,
}

/// Minimal object store used by the pipeline.
pub trait ObjectStore: Sync {
    /// Fetch an object and its content-type.
    fn get(&self, bucket: &str, key: &str) -> Result<StoredObject, StorageError>;

    /// Write (or overwrite) an object.
    fn put(&self, bucket: &str, request: &PutRequest) -> Result<(), StorageError>;
}
