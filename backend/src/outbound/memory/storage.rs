//! In-memory object storage bucket.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::ports::{ObjectStorage, ObjectStorageError};

use super::poisoned;

const DEFAULT_BUCKET: &str = "projects";

struct StoredObject {
    content_type: String,
    bytes: Vec<u8>,
}

/// Object storage holding uploads in a map keyed by path.
///
/// A storage created with [`MemoryObjectStorage::without_bucket`] rejects
/// every upload as if the bucket did not exist, which routes attachments to
/// the fallback file store.
pub struct MemoryObjectStorage {
    bucket: String,
    bucket_exists: bool,
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl Default for MemoryObjectStorage {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_BUCKET.to_owned(),
            bucket_exists: true,
            objects: RwLock::new(HashMap::new()),
        }
    }
}

impl MemoryObjectStorage {
    /// Storage whose bucket is missing.
    pub fn without_bucket(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            bucket_exists: false,
            ..Self::default()
        }
    }

    /// Content type and size of a stored object.
    pub fn object_info(&self, path: &str) -> Option<(String, usize)> {
        let objects = self.objects.read().ok()?;
        objects
            .get(path)
            .map(|object| (object.content_type.clone(), object.bytes.len()))
    }
}

#[async_trait]
impl ObjectStorage for MemoryObjectStorage {
    async fn upload(
        &self,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ObjectStorageError> {
        if !self.bucket_exists {
            return Err(ObjectStorageError::bucket_missing(self.bucket.as_str()));
        }
        self.objects
            .write()
            .map_err(|_| ObjectStorageError::unavailable(poisoned("object storage")))?
            .insert(
                path.to_owned(),
                StoredObject {
                    content_type: content_type.to_owned(),
                    bytes,
                },
            );
        Ok(format!("memory://{}/{path}", self.bucket))
    }
}
