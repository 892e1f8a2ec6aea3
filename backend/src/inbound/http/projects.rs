//! Project API handlers.
//!
//! ```text
//! GET    /api/v1/projects
//! POST   /api/v1/projects {"title":"Brand refresh","description":"Logo and palette"}
//! GET    /api/v1/projects/{id}
//! PATCH  /api/v1/projects/{id} {"title":"Brand refresh v2"}
//! DELETE /api/v1/projects/{id}
//! POST   /api/v1/projects/{id}/assignment {"designerId":"..."}
//! POST   /api/v1/projects/{id}/completion
//! POST   /api/v1/projects/{id}/files/{filename}   (raw body)
//! GET    /api/v1/dashboard
//! ```
//!
//! Each handler binds a fresh [`ProjectWorkspace`](crate::domain::ProjectWorkspace)
//! to the identity resolved for the request.

use actix_web::http::header::CONTENT_TYPE;
use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{FileUpload, Project, ProjectDraft, ProjectPatch, StatusSummary, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::identity::RequestSession;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_project_id, parse_user_id};

const PROJECT_ID: FieldName = FieldName::new("id");
const DESIGNER_ID: FieldName = FieldName::new("designerId");
/// Projects shown on the dashboard.
const RECENT_PROJECTS: usize = 5;

/// Body for `POST /api/v1/projects`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    #[schema(example = "Brand refresh")]
    pub title: String,
    #[schema(example = "New logo and palette")]
    pub description: String,
    #[serde(default)]
    pub files: Vec<String>,
}

/// Body for `PATCH /api/v1/projects/{id}`; omitted fields are unchanged.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub files: Option<Vec<String>>,
}

/// Body for `POST /api/v1/projects/{id}/assignment`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignDesignerRequest {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub designer_id: String,
}

/// Dashboard payload.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub user: User,
    pub summary: StatusSummary,
    /// Most recent projects, newest first.
    pub recent_projects: Vec<Project>,
}

/// List projects visible to the caller.
#[utoipa::path(
    get,
    path = "/api/v1/projects",
    responses(
        (status = 200, description = "Projects in the caller's scope", body = [Project]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Project store unavailable", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "listProjects"
)]
#[get("/projects")]
pub async fn list_projects(
    state: web::Data<HttpState>,
    session: RequestSession,
) -> ApiResult<web::Json<Vec<Project>>> {
    let identity = session.require_identity()?.clone();
    let mut workspace = state.workspace(Some(identity));
    Ok(web::Json(workspace.list().await?.to_vec()))
}

/// Create a pending project owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = Project),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Designers cannot create projects", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "createProject"
)]
#[post("/projects")]
pub async fn create_project(
    state: web::Data<HttpState>,
    session: RequestSession,
    payload: web::Json<CreateProjectRequest>,
) -> ApiResult<HttpResponse> {
    let identity = session.require_identity()?.clone();
    let CreateProjectRequest {
        title,
        description,
        files,
    } = payload.into_inner();
    let draft = ProjectDraft::try_from_parts(&title, &description, files)?;
    let created = state.workspace(Some(identity)).create(draft).await?;
    Ok(HttpResponse::Created().json(created))
}

/// Fetch one project.
#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}",
    params(("id" = String, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project", body = Project),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found or not visible", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "getProject"
)]
#[get("/projects/{id}")]
pub async fn get_project(
    state: web::Data<HttpState>,
    session: RequestSession,
    path: web::Path<String>,
) -> ApiResult<web::Json<Project>> {
    let id = parse_project_id(&path, PROJECT_ID)?;
    let identity = session.require_identity()?.clone();
    Ok(web::Json(state.workspace(Some(identity)).get(&id).await?))
}

/// Edit title, description or file list.
#[utoipa::path(
    patch,
    path = "/api/v1/projects/{id}",
    params(("id" = String, Path, description = "Project id")),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Updated project", body = Project),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not allowed to edit", body = ErrorSchema),
        (status = 404, description = "Not found or not visible", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "updateProject"
)]
#[patch("/projects/{id}")]
pub async fn update_project(
    state: web::Data<HttpState>,
    session: RequestSession,
    path: web::Path<String>,
    payload: web::Json<UpdateProjectRequest>,
) -> ApiResult<web::Json<Project>> {
    let id = parse_project_id(&path, PROJECT_ID)?;
    let identity = session.require_identity()?.clone();
    let UpdateProjectRequest {
        title,
        description,
        files,
    } = payload.into_inner();
    let patch = ProjectPatch::content(title.as_deref(), description.as_deref(), files)?;
    Ok(web::Json(
        state.workspace(Some(identity)).update(&id, patch).await?,
    ))
}

/// Delete a project. Project managers only.
#[utoipa::path(
    delete,
    path = "/api/v1/projects/{id}",
    params(("id" = String, Path, description = "Project id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Project managers only", body = ErrorSchema),
        (status = 404, description = "Not found or not visible", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "deleteProject"
)]
#[delete("/projects/{id}")]
pub async fn delete_project(
    state: web::Data<HttpState>,
    session: RequestSession,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_project_id(&path, PROJECT_ID)?;
    let identity = session.require_identity()?.clone();
    state.workspace(Some(identity)).delete(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Assign a designer, moving the project to `in_progress`.
#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/assignment",
    params(("id" = String, Path, description = "Project id")),
    request_body = AssignDesignerRequest,
    responses(
        (status = 200, description = "Assigned project", body = Project),
        (status = 400, description = "Assignee is not a designer", body = ErrorSchema),
        (status = 403, description = "Project managers only", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Project already completed", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "assignDesigner"
)]
#[post("/projects/{id}/assignment")]
pub async fn assign_designer(
    state: web::Data<HttpState>,
    session: RequestSession,
    path: web::Path<String>,
    payload: web::Json<AssignDesignerRequest>,
) -> ApiResult<web::Json<Project>> {
    let id = parse_project_id(&path, PROJECT_ID)?;
    let designer = parse_user_id(&payload.designer_id, DESIGNER_ID)?;
    let identity = session.require_identity()?.clone();
    Ok(web::Json(
        state
            .workspace(Some(identity))
            .assign_designer(&id, &designer)
            .await?,
    ))
}

/// Mark a project completed. Assigned designer only.
#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/completion",
    params(("id" = String, Path, description = "Project id")),
    responses(
        (status = 200, description = "Completed project", body = Project),
        (status = 403, description = "Not the assigned designer", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Project is not in progress", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "completeProject"
)]
#[post("/projects/{id}/completion")]
pub async fn complete_project(
    state: web::Data<HttpState>,
    session: RequestSession,
    path: web::Path<String>,
) -> ApiResult<web::Json<Project>> {
    let id = parse_project_id(&path, PROJECT_ID)?;
    let identity = session.require_identity()?.clone();
    Ok(web::Json(
        state.workspace(Some(identity)).mark_completed(&id).await?,
    ))
}

/// Upload one attachment and append its URL to the project's files.
///
/// The body is the raw file; its `Content-Type` is stored with it.
#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/files/{filename}",
    params(
        ("id" = String, Path, description = "Project id"),
        ("filename" = String, Path, description = "Original file name; the extension is checked")
    ),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Project with the new attachment", body = Project),
        (status = 400, description = "Rejected file", body = ErrorSchema),
        (status = 403, description = "Not allowed to edit", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "uploadProjectFile"
)]
#[post("/projects/{id}/files/{filename}")]
pub async fn upload_project_file(
    state: web::Data<HttpState>,
    session: RequestSession,
    path: web::Path<(String, String)>,
    req: HttpRequest,
    body: web::Bytes,
) -> ApiResult<web::Json<Project>> {
    let (raw_id, original_name) = path.into_inner();
    let id = parse_project_id(&raw_id, PROJECT_ID)?;
    let identity = session.require_identity()?.clone();
    let mut workspace = state.workspace(Some(identity.clone()));
    // Check access before anything reaches storage.
    let project = workspace.get(&id).await?;
    workspace.ensure_editable(&project)?;

    let upload = FileUpload {
        original_name,
        content_type: req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned),
        bytes: body.to_vec(),
    };
    let urls = state
        .attachments()
        .upload_batch(identity.id(), vec![upload])
        .await?;
    Ok(web::Json(workspace.attach_files(&id, urls).await?))
}

/// Status counts and recent projects for the caller.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    responses(
        (status = 200, description = "Dashboard", body = DashboardResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "dashboard"
)]
#[get("/dashboard")]
pub async fn dashboard(
    state: web::Data<HttpState>,
    session: RequestSession,
) -> ApiResult<web::Json<DashboardResponse>> {
    let user = session.require_identity()?.clone();
    let mut workspace = state.workspace(Some(user.clone()));
    let recent_projects = workspace
        .list()
        .await?
        .iter()
        .take(RECENT_PROJECTS)
        .cloned()
        .collect();
    Ok(web::Json(DashboardResponse {
        user,
        summary: workspace.summary(),
        recent_projects,
    }))
}

#[cfg(test)]
mod tests;
