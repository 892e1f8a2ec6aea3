//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST endpoint, the guarded page views, the
//! fallback file store and the health probes, together with the schemas they
//! exchange. Domain types that carry no utoipa derive are described through
//! wrappers in [`crate::inbound::http::schemas`].
//!
//! The document backs Swagger UI in debug builds and is exported by
//! `cargo run --bin openapi-dump`.

use crate::domain::{Locale, Project, ProjectStatus, Role, StatusSummary, User};
use crate::inbound::http::files::StoredFileResponse;
use crate::inbound::http::pages::PageView;
use crate::inbound::http::projects::{
    AssignDesignerRequest, CreateProjectRequest, DashboardResponse, UpdateProjectRequest,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::translations::TranslationsResponse;
use crate::inbound::http::users::{LoginRequest, RegisterRequest};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the DesignDesk API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "DesignDesk API",
        description = "Design project tracking for clients, designers and project managers."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::list_designers,
        crate::inbound::http::projects::list_projects,
        crate::inbound::http::projects::create_project,
        crate::inbound::http::projects::get_project,
        crate::inbound::http::projects::update_project,
        crate::inbound::http::projects::delete_project,
        crate::inbound::http::projects::assign_designer,
        crate::inbound::http::projects::complete_project,
        crate::inbound::http::projects::upload_project_file,
        crate::inbound::http::projects::dashboard,
        crate::inbound::http::files::file_options,
        crate::inbound::http::files::get_file,
        crate::inbound::http::files::store_file,
        crate::inbound::http::translations::get_translations,
        crate::inbound::http::pages::login_page,
        crate::inbound::http::pages::logout_page,
        crate::inbound::http::pages::dashboard_page,
        crate::inbound::http::pages::project_list_page,
        crate::inbound::http::pages::new_project_page,
        crate::inbound::http::pages::project_detail_page,
        crate::inbound::http::pages::edit_project_page,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        User,
        Role,
        Project,
        ProjectStatus,
        StatusSummary,
        Locale,
        RegisterRequest,
        LoginRequest,
        CreateProjectRequest,
        UpdateProjectRequest,
        AssignDesignerRequest,
        DashboardResponse,
        StoredFileResponse,
        TranslationsResponse,
        PageView,
    )),
    tags(
        (name = "users", description = "Registration, sessions and profiles"),
        (name = "projects", description = "Role-scoped design projects"),
        (name = "files", description = "Fallback attachment store"),
        (name = "translations", description = "Message catalogues"),
        (name = "pages", description = "Guarded page views"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
