//! Message catalogue endpoint.
//!
//! ```text
//! GET /api/v1/translations/{locale}
//! ```

use std::collections::BTreeMap;

use actix_web::http::header::{CacheControl, CacheDirective};
use actix_web::{HttpResponse, get, web};
use serde::Serialize;

use crate::domain::{Locale, catalogue};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::validation::{FieldName, parse_locale};

/// Every message of one locale keyed by its dotted key.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TranslationsResponse {
    pub locale: Locale,
    pub messages: BTreeMap<&'static str, &'static str>,
}

/// Fetch the catalogue for `locale` (`es` or `en`).
#[utoipa::path(
    get,
    path = "/api/v1/translations/{locale}",
    params(("locale" = String, Path, description = "Locale code")),
    responses(
        (status = 200, description = "Catalogue", body = TranslationsResponse),
        (status = 400, description = "Unsupported locale", body = ErrorSchema)
    ),
    tags = ["translations"],
    security([])
)]
#[get("/translations/{locale}")]
pub async fn get_translations(path: web::Path<String>) -> ApiResult<HttpResponse> {
    let locale = parse_locale(&path, FieldName::new("locale"))?;
    Ok(HttpResponse::Ok()
        .insert_header(CacheControl(vec![
            CacheDirective::Public,
            CacheDirective::MaxAge(3600),
        ]))
        .json(TranslationsResponse {
            locale,
            messages: catalogue(locale),
        }))
}
