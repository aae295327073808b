//! Filesystem-backed object store.
//!
//! ## Layout
//!
//! ```text
//! <root>/
//! └── <bucket>/
//!     ├── original/photo.jpg            # object bytes, key = relative path
//!     ├── thumbnails/photo.jpg
//!     └── .meta/
//!         └── thumbnails/photo.jpg.json # content-type, cache-control, metadata
//! ```
//!
//! Objects written through [`FsStore`] get a JSON sidecar under `.meta/`.
//! Objects dropped into the tree by other means have none; their
//! content-type is guessed from the key's extension, defaulting to
//! `application/octet-stream`.

use super::{ObjectStore, PutRequest, StorageError, StoredObject};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

/// Directory (inside each bucket) holding attribute sidecars.
const META_DIR: &str = ".meta";

/// Attributes persisted alongside an object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectAttributes {
    pub content_type: String,
    pub cache_control: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

/// Object store rooted at a local directory; each bucket is a subdirectory.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn denied(bucket: &str, key: &str, reason: &str) -> StorageError {
        StorageError::AccessDenied {
            bucket: bucket.to_string(),
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Resolve a bucket/key pair to a path, rejecting anything that could
    /// escape the bucket directory or land in the sidecar tree.
    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, StorageError> {
        if bucket.is_empty() || bucket.contains(['/', '\\']) || bucket == "." || bucket == ".." {
            return Err(Self::denied(bucket, key, "invalid bucket name"));
        }
        if key.is_empty() || key.starts_with('/') || key.contains('\\') {
            return Err(Self::denied(bucket, key, "invalid key"));
        }
        if key.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..") {
            return Err(Self::denied(bucket, key, "invalid key segment"));
        }
        if key.split('/').next() == Some(META_DIR) {
            return Err(Self::denied(bucket, key, "reserved prefix"));
        }
        Ok(self.root.join(bucket).join(key))
    }

    fn meta_path(&self, bucket: &str, key: &str) -> PathBuf {
        self.root
            .join(bucket)
            .join(META_DIR)
            .join(format!("{key}.json"))
    }

    /// Read an object's sidecar attributes, if any.
    pub fn attributes(&self, bucket: &str, key: &str) -> Result<Option<ObjectAttributes>, StorageError> {
        self.object_path(bucket, key)?;
        let path = self.meta_path(bucket, key);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StorageError::Read {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                    source,
                });
            }
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| StorageError::Read {
                bucket: bucket.to_string(),
                key: key.to_string(),
                source: io::Error::new(io::ErrorKind::InvalidData, e),
            })
    }

    fn write_file(path: &Path, bytes: &[u8]) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, bytes)
    }
}

impl ObjectStore for FsStore {
    fn get(&self, bucket: &str, key: &str) -> Result<StoredObject, StorageError> {
        let path = self.object_path(bucket, key)?;
        let bytes = std::fs::read(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            },
            io::ErrorKind::PermissionDenied => Self::denied(bucket, key, &source.to_string()),
            _ => StorageError::Read {
                bucket: bucket.to_string(),
                key: key.to_string(),
                source,
            },
        })?;

        let content_type = match self.attributes(bucket, key)? {
            Some(attrs) => Some(attrs.content_type),
            None => Some(
                mime_guess::from_path(key)
                    .first_or_octet_stream()
                    .essence_str()
                    .to_string(),
            ),
        };

        Ok(StoredObject {
            bytes,
            content_type,
        })
    }

    fn put(&self, bucket: &str, request: &PutRequest) -> Result<(), StorageError> {
        let key = request.key.as_str();
        let path = self.object_path(bucket, key)?;
        let write_error = |source| StorageError::Write {
            bucket: bucket.to_string(),
            key: key.to_string(),
            source,
        };

        let attrs = ObjectAttributes {
            content_type: request.content_type.clone(),
            cache_control: request.cache_control.clone(),
            metadata: request.metadata.clone(),
        };
        let json = serde_json::to_vec_pretty(&attrs)
            .map_err(|e| write_error(io::Error::new(io::ErrorKind::InvalidData, e)))?;

        Self::write_file(&path, &request.bytes).map_err(write_error)?;
        Self::write_file(&self.meta_path(bucket, key), &json).map_err(write_error)?;

        tracing::debug!(bucket, key, bytes = request.bytes.len(), "stored object");
        Ok(())
    }
}
