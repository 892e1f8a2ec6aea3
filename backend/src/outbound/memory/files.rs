//! Process-local fallback file store.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::ports::{FileStore, FileStoreError};
use crate::domain::{StoredFile, StoredFileName};

use super::poisoned;

/// Files keyed by name; contents are lost on restart.
#[derive(Default)]
pub struct MemoryFileStore {
    files: RwLock<HashMap<StoredFileName, StoredFile>>,
}

fn lock_error() -> FileStoreError {
    FileStoreError::unavailable(poisoned("file store"))
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn put(&self, file: StoredFile) -> Result<(), FileStoreError> {
        self.files
            .write()
            .map_err(|_| lock_error())?
            .insert(file.name.clone(), file);
        Ok(())
    }

    async fn get(&self, name: &StoredFileName) -> Result<Option<StoredFile>, FileStoreError> {
        Ok(self.files.read().map_err(|_| lock_error())?.get(name).cloned())
    }
}
