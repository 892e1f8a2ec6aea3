//! Object storage adapter for the hosted bucket API.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode, Url};
use tracing::debug;

use super::client::{CallFailure, SupabaseClient};
use crate::domain::ports::{ObjectStorage, ObjectStorageError};

const CACHE_CONTROL_SECONDS: &str = "3600";

/// [`ObjectStorage`] uploading into the configured bucket.
#[derive(Clone)]
pub struct SupabaseObjectStorage {
    client: SupabaseClient,
}

impl SupabaseObjectStorage {
    /// Adapter sharing `client` with the other Supabase adapters.
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    fn object_url(&self, prefix: &str, path: &str) -> Result<Url, ObjectStorageError> {
        let mut url = self
            .client
            .endpoint(prefix)
            .map_err(|failure| map_failure(failure, self.client.bucket()))?;
        url.path_segments_mut()
            .map_err(|()| ObjectStorageError::unavailable("storage URL cannot take a path"))?
            .pop_if_empty()
            .push(self.client.bucket())
            .extend(path.split('/').filter(|segment| !segment.is_empty()));
        Ok(url)
    }
}

fn map_failure(failure: CallFailure, bucket: &str) -> ObjectStorageError {
    if failure.mentions("bucket not found") || failure.status() == Some(StatusCode::NOT_FOUND) {
        return ObjectStorageError::bucket_missing(bucket);
    }
    if failure.mentions("row-level security") || failure.mentions("row level security") {
        return ObjectStorageError::policy_rejected(failure.message());
    }
    match failure.status() {
        Some(status) if status.is_client_error() => ObjectStorageError::rejected(failure.message()),
        _ => ObjectStorageError::unavailable(failure.message()),
    }
}

#[async_trait]
impl ObjectStorage for SupabaseObjectStorage {
    async fn upload(
        &self,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ObjectStorageError> {
        let url = self.object_url("storage/v1/object/", path)?;
        let request = self
            .client
            .request(Method::POST, url)
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .header("cache-control", CACHE_CONTROL_SECONDS)
            .body(bytes);
        self.client
            .send(request)
            .await
            .map_err(|failure| map_failure(failure, self.client.bucket()))?;

        let public = self.object_url("storage/v1/object/public/", path)?;
        debug!(url = %public, "uploaded attachment");
        Ok(public.into())
    }
}
