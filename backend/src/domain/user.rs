//! Application user model: identifiers, email, role and full name.
//!
//! A [`User`] is the application-level record mirrored from the auth service
//! at registration time. Its [`Role`] drives every access decision.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Error, field_error};

/// Validation errors raised while building user values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("user id must not be empty")]
    EmptyId,
    #[error("user id must be a valid UUID")]
    InvalidId,
    #[error("email must not be empty")]
    EmptyEmail,
    #[error("email address is not valid")]
    InvalidEmail,
    #[error("full name must be at most {max} characters")]
    FullNameTooLong { max: usize },
    #[error("full name must not contain markup characters")]
    FullNameInvalidCharacters,
    #[error("role must be one of client, designer or project_manager")]
    UnknownRole,
}

impl UserValidationError {
    /// Form field the error relates to, used in error details.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyId | Self::InvalidId => "id",
            Self::EmptyEmail | Self::InvalidEmail => "email",
            Self::FullNameTooLong { .. } | Self::FullNameInvalidCharacters => "fullName",
            Self::UnknownRole => "role",
        }
    }

    /// Stable machine-readable reason.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyId | Self::EmptyEmail => "missing_field",
            Self::InvalidId => "invalid_uuid",
            Self::InvalidEmail => "invalid_email",
            Self::FullNameTooLong { .. } => "too_long",
            Self::FullNameInvalidCharacters => "invalid_characters",
            Self::UnknownRole => "unknown_role",
        }
    }
}

impl From<UserValidationError> for Error {
    fn from(value: UserValidationError) -> Self {
        field_error(value.field(), value.code(), value.to_string())
    }
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid, String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Wrap an already parsed UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid, uuid.to_string())
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }
        let parsed = Uuid::parse_str(&id).map_err(|_| UserValidationError::InvalidId)?;
        Ok(Self(parsed, id))
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.1
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Email address accepted by the auth service.
///
/// The value is stored exactly as given; callers sanitise raw form input with
/// [`crate::domain::sanitize_email`] first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

impl Email {
    /// Validate and construct an [`Email`].
    ///
    /// # Examples
    /// ```
    /// use designdesk::domain::Email;
    ///
    /// assert!(Email::new("ana@studio.io").is_ok());
    /// assert!(Email::new("ana@studio").is_err());
    /// ```
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        let email = email.into();
        if email.trim().is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if !email_regex().is_match(&email) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(email))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Role held by a user; fixed at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Commissions projects and owns them.
    Client,
    /// Works on projects assigned by a manager.
    Designer,
    /// Sees every project, assigns designers and deletes projects.
    ProjectManager,
}

impl Role {
    /// Every role, in display order.
    pub const ALL: [Role; 3] = [Role::Client, Role::Designer, Role::ProjectManager];

    /// Wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Designer => "designer",
            Self::ProjectManager => "project_manager",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s.trim())
            .ok_or(UserValidationError::UnknownRole)
    }
}

/// Optional human name shown on dashboards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FullName(String);

/// Maximum allowed length for a full name.
pub const FULL_NAME_MAX: usize = 100;

impl FullName {
    /// Trim and validate a full name. Blank input yields `Ok(None)`.
    pub fn parse(raw: &str) -> Result<Option<Self>, UserValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        Self::new(trimmed).map(Some)
    }

    /// Validate a non-blank full name.
    pub fn new(name: impl Into<String>) -> Result<Self, UserValidationError> {
        let name = name.into();
        if name.chars().count() > FULL_NAME_MAX {
            return Err(UserValidationError::FullNameTooLong { max: FULL_NAME_MAX });
        }
        if name.contains(['<', '>']) {
            return Err(UserValidationError::FullNameInvalidCharacters);
        }
        Ok(Self(name))
    }
}

impl AsRef<str> for FullName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<FullName> for String {
    fn from(value: FullName) -> Self {
        value.0
    }
}

impl TryFrom<String> for FullName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Application user record.
///
/// ## Invariants
/// - `id` matches the auth-service identity id.
/// - `role` never changes after registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "UserDto", into = "UserDto")]
#[schema(rename_all = "camelCase")]
pub struct User {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: UserId,
    #[schema(value_type = String, example = "ana@studio.io")]
    email: Email,
    role: Role,
    #[schema(value_type = Option<String>, example = "Ana Torres")]
    full_name: Option<FullName>,
}

impl User {
    /// Build a new [`User`] from validated components.
    pub fn new(id: UserId, email: Email, role: Role, full_name: Option<FullName>) -> Self {
        Self {
            id,
            email,
            role,
            full_name,
        }
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Contact email.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Role driving access decisions.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Optional full name.
    pub fn full_name(&self) -> Option<&FullName> {
        self.full_name.as_ref()
    }

    /// Name for display, falling back to the email address.
    pub fn display_label(&self) -> &str {
        self.full_name
            .as_ref()
            .map_or_else(|| self.email.as_ref(), |name| name.as_ref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserDto {
    id: String,
    email: String,
    role: Role,
    #[serde(default, alias = "full_name", skip_serializing_if = "Option::is_none")]
    full_name: Option<String>,
}

impl From<User> for UserDto {
    fn from(value: User) -> Self {
        Self {
            id: value.id.into(),
            email: value.email.into(),
            role: value.role,
            full_name: value.full_name.map(Into::into),
        }
    }
}

impl TryFrom<UserDto> for User {
    type Error = UserValidationError;

    fn try_from(value: UserDto) -> Result<Self, Self::Error> {
        let full_name = match value.full_name {
            Some(raw) => FullName::parse(&raw)?,
            None => None,
        };
        Ok(Self::new(
            UserId::new(value.id)?,
            Email::new(value.email)?,
            value.role,
            full_name,
        ))
    }
}
