//! Shared reqwest client and failure mapping for the Supabase adapters.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use zeroize::Zeroizing;

/// Header carrying the project API key.
const API_KEY_HEADER: &str = "apikey";

/// Connection settings for the backend-as-a-service.
#[derive(Clone)]
pub struct SupabaseConfig {
    /// Project base URL, e.g. `https://xyz.supabase.co/`.
    pub base_url: Url,
    /// Service or anon key sent as `apikey` and default bearer token.
    pub api_key: Zeroizing<String>,
    /// Storage bucket holding project attachments.
    pub bucket: String,
    /// Request timeout applied to every call.
    pub timeout: Duration,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("base_url", &self.base_url.as_str())
            .field("bucket", &self.bucket)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Errors raised while constructing the client.
#[derive(Debug, thiserror::Error)]
pub enum SupabaseClientError {
    #[error("api key is not a valid header value")]
    InvalidApiKey,
    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Failure of a single round-trip, before port-specific mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum CallFailure {
    /// No response arrived (connect error, timeout, broken body).
    Transport { message: String },
    /// The service answered with a non-success status.
    Status { status: StatusCode, message: String },
}

impl CallFailure {
    pub(super) fn message(&self) -> &str {
        match self {
            Self::Transport { message } | Self::Status { message, .. } => message,
        }
    }

    pub(super) fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Transport { .. } => None,
            Self::Status { status, .. } => Some(*status),
        }
    }

    /// Case-insensitive search in the failure message.
    pub(super) fn mentions(&self, needle: &str) -> bool {
        self.message()
            .to_ascii_lowercase()
            .contains(&needle.to_ascii_lowercase())
    }
}

/// Client shared by all Supabase adapters.
#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    base_url: Url,
    bucket: String,
}

impl SupabaseClient {
    /// Build a client with default `apikey` and bearer headers.
    ///
    /// # Errors
    ///
    /// Returns an error when the key is not a valid header value or the
    /// reqwest client cannot be constructed.
    pub fn new(config: SupabaseConfig) -> Result<Self, SupabaseClientError> {
        let mut api_key = HeaderValue::from_str(config.api_key.as_str())
            .map_err(|_| SupabaseClientError::InvalidApiKey)?;
        api_key.set_sensitive(true);
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key.as_str()))
            .map_err(|_| SupabaseClientError::InvalidApiKey)?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, api_key);
        headers.insert(AUTHORIZATION, bearer);

        let http = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;
        Ok(Self {
            http,
            base_url: ensure_trailing_slash(config.base_url),
            bucket: config.bucket,
        })
    }

    pub(super) fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Join `path` onto the base URL.
    pub(super) fn endpoint(&self, path: &str) -> Result<Url, CallFailure> {
        self.base_url
            .join(path)
            .map_err(|error| CallFailure::Transport {
                message: format!("invalid endpoint {path}: {error}"),
            })
    }

    pub(super) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http.request(method, url)
    }

    /// Send `request` and return the body of a successful response.
    pub(super) async fn send(&self, request: RequestBuilder) -> Result<Vec<u8>, CallFailure> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok(body.to_vec())
    }
}

/// Decode a JSON body, reporting failures as plain text for port errors.
pub(super) fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, String> {
    serde_json::from_slice(body).map_err(|error| format!("malformed response: {error}"))
}

fn ensure_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn map_transport_error(error: reqwest::Error) -> CallFailure {
    let message = if error.is_timeout() {
        format!("request timed out: {error}")
    } else {
        error.to_string()
    };
    CallFailure::Transport { message }
}

pub(super) fn map_status_error(status: StatusCode, body: &[u8]) -> CallFailure {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), preview)
    };
    CallFailure::Status { status, message }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn config(base: &str) -> SupabaseConfig {
        SupabaseConfig {
            base_url: Url::parse(base).expect("valid url"),
            api_key: Zeroizing::new("service-key".to_owned()),
            bucket: "projects".to_owned(),
            timeout: Duration::from_secs(10),
        }
    }

    #[rstest]
    #[case("https://demo.supabase.co")]
    #[case("https://demo.supabase.co/")]
    fn endpoints_join_under_base(#[case] base: &str) {
        let client = SupabaseClient::new(config(base)).expect("client builds");

        let url = client.endpoint("rest/v1/projects").expect("joins");

        assert_eq!(url.as_str(), "https://demo.supabase.co/rest/v1/projects");
    }

    #[rstest]
    fn keys_with_newlines_are_rejected() {
        let mut bad = config("https://demo.supabase.co");
        bad.api_key = Zeroizing::new("line\nbreak".to_owned());

        assert!(matches!(
            SupabaseClient::new(bad),
            Err(SupabaseClientError::InvalidApiKey)
        ));
    }

    #[rstest]
    fn status_errors_carry_a_compact_preview() {
        let failure = map_status_error(
            StatusCode::BAD_REQUEST,
            b"{\n  \"message\": \"Bucket not found\"\n}",
        );

        assert_eq!(failure.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(failure.message(), "status 400: { \"message\": \"Bucket not found\" }");
        assert!(failure.mentions("bucket NOT found"));
    }

    #[rstest]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(400);
        let failure = map_status_error(StatusCode::BAD_GATEWAY, body.as_bytes());

        assert!(failure.message().ends_with("..."));
        assert!(failure.message().len() < 200);
    }

    #[rstest]
    fn debug_output_hides_the_key() {
        let rendered = format!("{:?}", config("https://demo.supabase.co"));
        assert!(!rendered.contains("service-key"));
    }
}
