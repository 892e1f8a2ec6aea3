//! Domain primitives, services and ports.
//!
//! Purpose: model users, roles, sessions and design projects independently of
//! HTTP and of the backend-as-a-service used for persistence. Keep types
//! validated at construction and document invariants in each type's Rustdoc.
//!
//! Public surface:
//! - [`Error`] / [`ErrorCode`]: transport-agnostic failure payload.
//! - [`User`], [`Role`]: application identity.
//! - [`SessionGate`], [`RouteGuard`]: identity resolution and page gating.
//! - [`ProjectWorkspace`]: role-scoped project operations with a local cache.
//! - [`AccountService`], [`AttachmentService`]: registration and uploads.

pub mod account_service;
pub mod attachments;
pub mod auth;
pub mod error;
pub mod localization;
pub mod ports;
pub mod project;
pub mod project_workspace;
pub mod route_guard;
pub mod session;
pub mod trace_id;
pub mod user;

pub use self::account_service::AccountService;
pub use self::attachments::{
    ALLOWED_EXTENSIONS, AttachmentService, AttachmentValidationError, DEFAULT_CONTENT_TYPE,
    FALLBACK_URL_PREFIX, FileUpload, MAX_FILE_BYTES, MAX_FILES_PER_BATCH, StoredFile,
    StoredFileName, validate_batch,
};
pub use self::auth::{
    AccessToken, AuthIdentity, AuthSession, AuthValidationError, LoginCredentials, RefreshToken,
    Registration, sanitize_email, sanitize_text,
};
pub(crate) use self::error::field_error;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::localization::{
    Locale, MessageKey, UnsupportedLocale, catalogue, translate, translate_dotted,
};
pub use self::project::{
    Project, ProjectDescription, ProjectDraft, ProjectId, ProjectPatch, ProjectScope,
    ProjectStatus, ProjectTitle, ProjectValidationError, StatusSummary,
};
pub use self::project_workspace::ProjectWorkspace;
pub use self::route_guard::{
    DASHBOARD_PATH, GuardState, LOGIN_PATH, Navigator, Page, PendingRedirect, RouteGuard,
    login_redirect,
};
pub use self::session::{AuthEvent, SessionGate, SessionSnapshot};
pub use self::trace_id::TraceId;
pub use self::user::{Email, FullName, Role, User, UserId, UserValidationError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use designdesk::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
