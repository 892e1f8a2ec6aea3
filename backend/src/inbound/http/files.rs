//! Fallback file endpoint serving attachments that object storage refused.
//!
//! ```text
//! OPTIONS /api/files/{filename}
//! GET     /api/files/{filename}
//! POST    /api/files/{filename}   (raw body)
//! ```
//!
//! Files live in the process-local [`FileStore`](crate::domain::ports::FileStore)
//! and are lost on restart.

use actix_web::http::header::{self, CacheControl, CacheDirective};
use actix_web::{HttpRequest, HttpResponse, get, options, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{DEFAULT_CONTENT_TYPE, Error, StoredFileName};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";
const MAX_AGE_SECONDS: u32 = 3600;

/// Response body for a stored file.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct StoredFileResponse {
    pub success: bool,
    #[schema(example = "/api/files/6f1c1b9e-8d4b-4c1a-9a55-2b8e0f3f4d21.pdf")]
    pub url: String,
}

fn file_name(path: &str) -> Result<StoredFileName, Error> {
    StoredFileName::new(path).map_err(|err| {
        Error::invalid_request(err.to_string())
            .with_details(serde_json::json!({ "field": "filename", "code": err.code() }))
    })
}

/// CORS preflight for the file endpoint.
#[utoipa::path(
    options,
    path = "/api/files/{filename}",
    params(("filename" = String, Path, description = "Stored file name")),
    responses((status = 200, description = "Preflight accepted")),
    tags = ["files"],
    operation_id = "fileOptions",
    security([])
)]
#[options("/api/files/{filename}")]
pub async fn file_options() -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
        .insert_header((header::ACCESS_CONTROL_ALLOW_METHODS, ALLOWED_METHODS))
        .insert_header((header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"))
        .finish()
}

/// Serve a stored file with its original content type.
#[utoipa::path(
    get,
    path = "/api/files/{filename}",
    params(("filename" = String, Path, description = "Stored file name")),
    responses(
        (status = 200, description = "File bytes"),
        (status = 404, description = "File not found", body = ErrorSchema)
    ),
    tags = ["files"],
    operation_id = "getFile",
    security([])
)]
#[get("/api/files/{filename}")]
pub async fn get_file(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let name = file_name(&path)?;
    let file = state.attachments().fetch_fallback(&name).await?;
    Ok(HttpResponse::Ok()
        .content_type(file.content_type)
        .insert_header(CacheControl(vec![
            CacheDirective::Public,
            CacheDirective::MaxAge(MAX_AGE_SECONDS),
        ]))
        .body(file.bytes))
}

/// Store the request body under `filename`.
#[utoipa::path(
    post,
    path = "/api/files/{filename}",
    params(("filename" = String, Path, description = "Stored file name")),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Stored", body = StoredFileResponse),
        (status = 400, description = "Invalid file name", body = ErrorSchema)
    ),
    tags = ["files"],
    operation_id = "storeFile",
    security([])
)]
#[post("/api/files/{filename}")]
pub async fn store_file(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    req: HttpRequest,
    body: web::Bytes,
) -> ApiResult<web::Json<StoredFileResponse>> {
    let name = file_name(&path)?;
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_owned();
    let url = state
        .attachments()
        .store_fallback(name, content_type, body.to_vec())
        .await?;
    Ok(web::Json(StoredFileResponse { success: true, url }))
}
