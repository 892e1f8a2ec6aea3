//! Port for the remote object storage bucket holding project attachments.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by object storage adapters.
    pub enum ObjectStorageError {
        /// The configured bucket does not exist.
        BucketMissing { bucket: String } => ServiceUnavailable,
            "storage bucket {bucket} does not exist",
        /// A row-level security policy refused the write.
        PolicyRejected { message: String } => Forbidden,
            "storage policy rejected the upload: {message}",
        /// The upload was refused for another reason.
        Rejected { message: String } => InvalidRequest, "storage rejected the upload: {message}",
        /// Storage could not be reached.
        Unavailable { message: String } => ServiceUnavailable,
            "storage unavailable: {message}",
    }
}

impl ObjectStorageError {
    /// Whether the upload should be redirected to the local file store.
    pub fn allows_fallback(&self) -> bool {
        matches!(self, Self::BucketMissing { .. } | Self::PolicyRejected { .. })
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Upload `bytes` at `path` and return the public URL of the object.
    async fn upload(
        &self,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ObjectStorageError>;
}
