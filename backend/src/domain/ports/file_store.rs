//! Port for the process-local fallback file store.

use async_trait::async_trait;

use crate::domain::{StoredFile, StoredFileName};

use super::define_port_error;

define_port_error! {
    /// Errors raised by file store adapters.
    pub enum FileStoreError {
        /// The store could not accept or serve the file.
        Unavailable { message: String } => ServiceUnavailable,
            "file store unavailable: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Store `file`, replacing any previous content under the same name.
    async fn put(&self, file: StoredFile) -> Result<(), FileStoreError>;

    /// Fetch a stored file.
    async fn get(&self, name: &StoredFileName) -> Result<Option<StoredFile>, FileStoreError>;
}
