//! Project attachments: upload validation, object storage with a local
//! fallback, and the fallback file store values.

use std::fmt;
use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use super::ports::{FileStore, ObjectStorage};
use super::{Error, UserId, field_error};

/// Maximum number of files in one upload batch.
pub const MAX_FILES_PER_BATCH: usize = 5;
/// Maximum size of a single file in bytes (5 MiB).
pub const MAX_FILE_BYTES: usize = 5 * 1024 * 1024;
/// Accepted file extensions, lower case.
pub const ALLOWED_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "pdf", "doc", "docx"];
/// Public prefix of files served by the fallback store.
pub const FALLBACK_URL_PREFIX: &str = "/api/files";
/// Content type used when none is supplied.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Upload validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttachmentValidationError {
    #[error("at most {max} files may be uploaded at once")]
    TooManyFiles { max: usize },
    #[error("{name} is empty")]
    EmptyFile { name: String },
    #[error("{name} exceeds the {max} byte limit")]
    TooLarge { name: String, max: usize },
    #[error("{name} has an unsupported file type")]
    UnsupportedExtension { name: String },
    #[error("file name is not valid")]
    InvalidName,
}

impl AttachmentValidationError {
    /// Machine-readable code placed in the error details.
    pub fn code(&self) -> &'static str {
        match self {
            Self::TooManyFiles { .. } => "too_many_files",
            Self::EmptyFile { .. } => "empty_file",
            Self::TooLarge { .. } => "file_too_large",
            Self::UnsupportedExtension { .. } => "unsupported_extension",
            Self::InvalidName => "invalid_file_name",
        }
    }
}

impl From<AttachmentValidationError> for Error {
    fn from(value: AttachmentValidationError) -> Self {
        field_error("files", value.code(), value.to_string())
    }
}

/// Flat file name accepted by the fallback store.
///
/// ## Invariants
/// - non-empty, at most 255 bytes
/// - no path separators and no `..`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoredFileName(String);

impl StoredFileName {
    /// Validate `raw` against the naming rules above.
    pub fn new(raw: impl Into<String>) -> Result<Self, AttachmentValidationError> {
        let raw = raw.into();
        let valid = !raw.is_empty()
            && raw.len() <= 255
            && !raw.contains(['/', '\\'])
            && !raw.contains("..");
        if valid {
            Ok(Self(raw))
        } else {
            Err(AttachmentValidationError::InvalidName)
        }
    }

    /// URL under which the fallback endpoint serves this file.
    pub fn fallback_url(&self) -> String {
        format!("{FALLBACK_URL_PREFIX}/{}", self.0)
    }
}

impl AsRef<str> for StoredFileName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoredFileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// File held by the fallback store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Key the file is served under.
    pub name: StoredFileName,
    /// MIME type echoed on download.
    pub content_type: String,
    /// Raw content.
    pub bytes: Vec<u8>,
}

/// File submitted for attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    /// Client-side file name; only its extension is kept.
    pub original_name: String,
    /// Declared MIME type, if any.
    pub content_type: Option<String>,
    /// Raw content.
    pub bytes: Vec<u8>,
}

impl FileUpload {
    /// Lower-cased extension if it is one of [`ALLOWED_EXTENSIONS`].
    fn extension(&self) -> Result<String, AttachmentValidationError> {
        self.original_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
            .ok_or_else(|| AttachmentValidationError::UnsupportedExtension {
                name: self.original_name.clone(),
            })
    }

    fn validate(&self) -> Result<String, AttachmentValidationError> {
        if self.bytes.is_empty() {
            return Err(AttachmentValidationError::EmptyFile {
                name: self.original_name.clone(),
            });
        }
        if self.bytes.len() > MAX_FILE_BYTES {
            return Err(AttachmentValidationError::TooLarge {
                name: self.original_name.clone(),
                max: MAX_FILE_BYTES,
            });
        }
        self.extension()
    }

    fn content_type(&self) -> &str {
        self.content_type
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
    }
}

/// Check batch size and every file before anything is uploaded.
pub fn validate_batch(uploads: &[FileUpload]) -> Result<(), AttachmentValidationError> {
    if uploads.len() > MAX_FILES_PER_BATCH {
        return Err(AttachmentValidationError::TooManyFiles {
            max: MAX_FILES_PER_BATCH,
        });
    }
    uploads.iter().try_for_each(|upload| upload.validate().map(drop))
}

/// Uploads attachments to object storage, falling back to the local store
/// when the bucket is missing or a storage policy rejects the write.
#[derive(Clone)]
pub struct AttachmentService {
    storage: Arc<dyn ObjectStorage>,
    fallback: Arc<dyn FileStore>,
}

impl AttachmentService {
    /// Service writing to `storage` and falling back to `fallback`.
    pub fn new(storage: Arc<dyn ObjectStorage>, fallback: Arc<dyn FileStore>) -> Self {
        Self { storage, fallback }
    }

    /// Validate and upload a batch, returning URLs in input order.
    pub async fn upload_batch(
        &self,
        owner: &UserId,
        uploads: Vec<FileUpload>,
    ) -> Result<Vec<String>, Error> {
        validate_batch(&uploads)?;
        let mut urls = Vec::with_capacity(uploads.len());
        for upload in uploads {
            urls.push(self.upload(owner, upload).await?);
        }
        Ok(urls)
    }

    /// Upload one file under `<owner>/<uuid>.<ext>`.
    pub async fn upload(&self, owner: &UserId, upload: FileUpload) -> Result<String, Error> {
        let extension = upload.validate()?;
        let name = StoredFileName::new(format!("{}.{extension}", Uuid::new_v4()))?;
        let path = format!("{owner}/{name}");
        let content_type = upload.content_type().to_owned();
        match self
            .storage
            .upload(&path, &content_type, upload.bytes.clone())
            .await
        {
            Ok(url) => Ok(url),
            Err(err) if err.allows_fallback() => {
                warn!(error = %err, %path, "object storage refused upload; using fallback store");
                self.store_fallback(name, content_type, upload.bytes).await
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Put a file straight into the fallback store and return its URL.
    pub async fn store_fallback(
        &self,
        name: StoredFileName,
        content_type: String,
        bytes: Vec<u8>,
    ) -> Result<String, Error> {
        let url = name.fallback_url();
        self.fallback
            .put(StoredFile {
                name,
                content_type,
                bytes,
            })
            .await?;
        Ok(url)
    }

    /// Read a file from the fallback store.
    pub async fn fetch_fallback(&self, name: &StoredFileName) -> Result<StoredFile, Error> {
        self.fallback
            .get(name)
            .await?
            .ok_or_else(|| Error::not_found(format!("file {name} not found")))
    }
}
