//! Account API handlers.
//!
//! ```text
//! POST /api/v1/register {"email":"ana@studio.io","password":"...","role":"client"}
//! POST /api/v1/login {"email":"ana@studio.io","password":"..."}
//! POST /api/v1/logout
//! GET /api/v1/users/me
//! GET /api/v1/designers
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{Error, LoginCredentials, Registration, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::identity::RequestSession;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Registration body for `POST /api/v1/register`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "ana@studio.io")]
    pub email: String,
    pub password: String,
    /// One of `client`, `designer`, `project_manager`.
    #[schema(example = "client")]
    pub role: String,
    #[serde(default)]
    #[schema(example = "Ana Torres")]
    pub full_name: String,
}

/// Login body for `POST /api/v1/login`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "ana@studio.io")]
    pub email: String,
    pub password: String,
}

/// Create an account and its single user profile.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = User),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema),
        (status = 503, description = "Auth service unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let RegisterRequest {
        email,
        password,
        role,
        full_name,
    } = payload.into_inner();
    let registration = Registration::try_from_parts(&email, &password, &role, &full_name)?;
    let user = state.accounts().register(&registration).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = User,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 503, description = "Auth service unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<User>> {
    let credentials = LoginCredentials::try_from_parts(&payload.email, &payload.password)?;
    let mut gate = state.session_gate(None);
    let user = state.accounts().login(&mut gate, &credentials).await?;
    let token = gate
        .access_token()
        .ok_or_else(|| Error::internal("signed-in gate has no access token"))?;
    session.persist_login(user.id(), token, gate.refresh_token())?;
    Ok(web::Json(user))
}

/// Sign out and clear the session cookie.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Signed out")),
    tags = ["users"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(state: web::Data<HttpState>, mut session: RequestSession) -> HttpResponse {
    // The local session is cleared even when the remote sign-out fails.
    if state.accounts().logout(&mut session.gate).await.is_err() {
        info!("remote sign-out failed; cookie purged");
    }
    session.cookie.purge();
    HttpResponse::NoContent().finish()
}

/// Current user profile.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(session: RequestSession) -> ApiResult<web::Json<User>> {
    Ok(web::Json(session.require_identity()?.clone()))
}

/// Designers available for assignment.
#[utoipa::path(
    get,
    path = "/api/v1/designers",
    responses(
        (status = 200, description = "Designers ordered by email", body = [User]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Project managers only", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listDesigners"
)]
#[get("/designers")]
pub async fn list_designers(
    state: web::Data<HttpState>,
    session: RequestSession,
) -> ApiResult<web::Json<Vec<User>>> {
    let caller = session.require_identity()?;
    Ok(web::Json(state.accounts().designers(caller).await?))
}
