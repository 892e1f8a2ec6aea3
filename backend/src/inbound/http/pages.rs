//! Guarded page views.
//!
//! Pages are served as JSON view descriptors rather than HTML. Each request
//! evaluates the page's [`RouteGuard`](crate::domain::RouteGuard) against the
//! resolved session; a redirect outcome answers `303 See Other` with the
//! target in `Location`.

use std::collections::BTreeMap;

use actix_web::http::header::{ACCEPT_LANGUAGE, LOCATION};
use actix_web::{HttpRequest, HttpResponse, get, web};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{
    LOGIN_PATH, Locale, MessageKey, Page, PendingRedirect, ProjectStatus, User, login_redirect,
    translate,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::identity::RequestSession;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_project_id};

const PROJECT_ID: FieldName = FieldName::new("id");

/// View descriptor for an authorised page.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    /// Page identifier, e.g. `project_list`.
    pub page: String,
    /// Concrete request path.
    pub path: String,
    /// Negotiated display locale.
    pub locale: Locale,
    /// Translated page title.
    pub title: String,
    /// Authenticated viewer; absent on the login page.
    pub user: Option<User>,
    /// Project addressed by detail and edit pages.
    pub project_id: Option<String>,
    /// Status labels in the negotiated locale, keyed by status.
    pub status_labels: BTreeMap<String, String>,
}

fn page_name(page: Page) -> &'static str {
    match page {
        Page::Dashboard => "dashboard",
        Page::ProjectList => "project_list",
        Page::NewProject => "new_project",
        Page::ProjectDetail => "project_detail",
        Page::EditProject => "edit_project",
    }
}

fn page_title(page: Page) -> MessageKey {
    match page {
        Page::Dashboard => MessageKey::NavDashboard,
        Page::ProjectList => MessageKey::NavProjects,
        Page::NewProject => MessageKey::ProjectsCreate,
        Page::ProjectDetail => MessageKey::NavProjects,
        Page::EditProject => MessageKey::ProjectsUpdate,
    }
}

fn request_locale(req: &HttpRequest) -> Locale {
    Locale::negotiate(
        req.headers()
            .get(ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok()),
    )
}

fn status_labels(locale: Locale) -> BTreeMap<String, String> {
    ProjectStatus::ALL
        .into_iter()
        .map(|status| {
            (
                status.as_str().to_owned(),
                translate(locale, status.into()).to_owned(),
            )
        })
        .collect()
}

fn see_other(target: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((LOCATION, target.to_owned()))
        .finish()
}

/// Redirect demanded by `page`'s guard, if any.
fn guard_redirect(page: Page, session: &RequestSession) -> Option<HttpResponse> {
    let mut redirect = PendingRedirect::default();
    let state = page.guard().enforce(&session.gate.snapshot(), &mut redirect);
    let target = redirect.target()?;
    debug!(page = page_name(page), ?state, redirect = target, "page guard redirected");
    Some(see_other(target))
}

fn view(
    page: Page,
    req: &HttpRequest,
    session: &RequestSession,
    project_id: Option<String>,
) -> HttpResponse {
    let locale = request_locale(req);
    HttpResponse::Ok().json(PageView {
        page: page_name(page).to_owned(),
        path: req.path().to_owned(),
        locale,
        title: translate(locale, page_title(page)).to_owned(),
        user: session.gate.identity().cloned(),
        project_id,
        status_labels: status_labels(locale),
    })
}

fn render(page: Page, req: &HttpRequest, session: &RequestSession) -> HttpResponse {
    guard_redirect(page, session).unwrap_or_else(|| view(page, req, session, None))
}

/// Guard first, then parse the id: visitors who may not see the page are
/// redirected whatever the path holds.
fn render_project_page(
    page: Page,
    req: &HttpRequest,
    session: &RequestSession,
    raw_id: &str,
) -> ApiResult<HttpResponse> {
    if let Some(redirect) = guard_redirect(page, session) {
        return Ok(redirect);
    }
    let id = parse_project_id(raw_id, PROJECT_ID)?;
    Ok(view(page, req, session, Some(id.to_string())))
}

/// Login page; authenticated visitors are sent to the dashboard.
#[utoipa::path(
    get,
    path = "/login",
    responses(
        (status = 200, description = "Login view", body = PageView),
        (status = 303, description = "Already signed in")
    ),
    tags = ["pages"],
    security([])
)]
#[get("/login")]
pub async fn login_page(req: HttpRequest, session: RequestSession) -> HttpResponse {
    if let Some(target) = login_redirect(&session.gate.snapshot()) {
        return see_other(target);
    }
    let locale = request_locale(&req);
    HttpResponse::Ok().json(PageView {
        page: "login".to_owned(),
        path: LOGIN_PATH.to_owned(),
        locale,
        title: translate(locale, MessageKey::AuthSignIn).to_owned(),
        user: None,
        project_id: None,
        status_labels: BTreeMap::new(),
    })
}

/// Sign out, clear the cookie and return to the login page.
#[utoipa::path(
    get,
    path = "/auth/logout",
    responses((status = 303, description = "Redirect to /login")),
    tags = ["pages"]
)]
#[get("/auth/logout")]
pub async fn logout_page(state: web::Data<HttpState>, mut session: RequestSession) -> HttpResponse {
    // The cookie is purged even when the remote sign-out fails.
    if state.accounts().logout(&mut session.gate).await.is_err() {
        debug!("remote sign-out failed during page logout");
    }
    session.cookie.purge();
    see_other(LOGIN_PATH)
}

/// Dashboard page.
#[utoipa::path(get, path = "/dashboard", tags = ["pages"],
    responses((status = 200, body = PageView), (status = 303, description = "Guard redirect")))]
#[get("/dashboard")]
pub async fn dashboard_page(req: HttpRequest, session: RequestSession) -> HttpResponse {
    render(Page::Dashboard, &req, &session)
}

/// Project list page.
#[utoipa::path(get, path = "/dashboard/projects", tags = ["pages"],
    responses((status = 200, body = PageView), (status = 303, description = "Guard redirect")))]
#[get("/dashboard/projects")]
pub async fn project_list_page(req: HttpRequest, session: RequestSession) -> HttpResponse {
    render(Page::ProjectList, &req, &session)
}

/// New project form. Clients and project managers.
#[utoipa::path(get, path = "/dashboard/projects/new", tags = ["pages"],
    responses((status = 200, body = PageView), (status = 303, description = "Guard redirect")))]
#[get("/dashboard/projects/new")]
pub async fn new_project_page(req: HttpRequest, session: RequestSession) -> HttpResponse {
    render(Page::NewProject, &req, &session)
}

/// Project detail page.
#[utoipa::path(get, path = "/dashboard/projects/{id}", tags = ["pages"],
    params(("id" = String, Path, description = "Project id")),
    responses((status = 200, body = PageView), (status = 303, description = "Guard redirect"),
        (status = 400, description = "Malformed project id", body = ErrorSchema)))]
#[get("/dashboard/projects/{id}")]
pub async fn project_detail_page(
    req: HttpRequest,
    session: RequestSession,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    render_project_page(Page::ProjectDetail, &req, &session, &path)
}

/// Project edit form. Project managers and clients.
#[utoipa::path(get, path = "/dashboard/projects/{id}/edit", tags = ["pages"],
    params(("id" = String, Path, description = "Project id")),
    responses((status = 200, body = PageView), (status = 303, description = "Guard redirect"),
        (status = 400, description = "Malformed project id", body = ErrorSchema)))]
#[get("/dashboard/projects/{id}/edit")]
pub async fn edit_project_page(
    req: HttpRequest,
    session: RequestSession,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    render_project_page(Page::EditProject, &req, &session, &path)
}

/// Register every page route on `cfg`.
///
/// `new` is registered before `{id}` so it is not captured as an id.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(login_page)
        .service(logout_page)
        .service(dashboard_page)
        .service(project_list_page)
        .service(new_project_page)
        .service(project_detail_page)
        .service(edit_project_page);
}
