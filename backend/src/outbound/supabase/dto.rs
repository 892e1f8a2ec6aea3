//! Wire rows for the auth API and the PostgREST tables.
//!
//! Tables use snake_case columns; conversion into domain types re-validates
//! every field so a malformed row surfaces as a decode error, not a panic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    AccessToken, AuthIdentity, AuthSession, Email, FullName, Project, ProjectDescription,
    ProjectId, ProjectPatch, ProjectStatus, ProjectTitle, RefreshToken, Role, User, UserId,
};

/// Auth user object as returned by `/auth/v1/user` and sign-up.
#[derive(Debug, Deserialize)]
pub(super) struct AuthUserDto {
    pub id: String,
    pub email: String,
}

impl AuthUserDto {
    pub(super) fn into_identity(self) -> Result<AuthIdentity, String> {
        Ok(AuthIdentity {
            id: UserId::new(&self.id).map_err(|err| err.to_string())?,
            email: Email::new(self.email).map_err(|err| err.to_string())?,
        })
    }
}

/// Sign-up answers with the user itself or, when confirmation is disabled,
/// with a session wrapping it.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum SignUpResponseDto {
    Session { user: AuthUserDto },
    User(AuthUserDto),
}

impl SignUpResponseDto {
    pub(super) fn into_user(self) -> AuthUserDto {
        match self {
            Self::Session { user } | Self::User(user) => user,
        }
    }
}

/// Password and refresh grant response.
#[derive(Debug, Deserialize)]
pub(super) struct TokenResponseDto {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: AuthUserDto,
}

impl TokenResponseDto {
    pub(super) fn into_session(self) -> Result<AuthSession, String> {
        Ok(AuthSession {
            identity: self.user.into_identity()?,
            access_token: AccessToken::new(self.access_token),
            refresh_token: self
                .refresh_token
                .filter(|token| !token.is_empty())
                .map(RefreshToken::new),
        })
    }
}

#[derive(Debug, Serialize)]
pub(super) struct SignUpMetadataDto<'a> {
    pub full_name: Option<&'a str>,
    pub role: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct SignUpRequestDto<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub data: SignUpMetadataDto<'a>,
}

#[derive(Debug, Serialize)]
pub(super) struct PasswordGrantDto<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct RefreshGrantDto<'a> {
    pub refresh_token: &'a str,
}

/// Row of the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(super) struct UserRow {
    pub id: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            email: user.email().to_string(),
            role: user.role().as_str().to_owned(),
            full_name: user.full_name().map(|name| name.as_ref().to_owned()),
        }
    }
}

impl TryFrom<UserRow> for User {
    type Error = String;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let full_name = row
            .full_name
            .as_deref()
            .map(FullName::parse)
            .transpose()
            .map_err(|err| err.to_string())?
            .flatten();
        Ok(Self::new(
            UserId::new(&row.id).map_err(|err| err.to_string())?,
            Email::new(row.email).map_err(|err| err.to_string())?,
            row.role.parse::<Role>().map_err(|err| err.to_string())?,
            full_name,
        ))
    }
}

/// Row of the `projects` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(super) struct ProjectRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub files: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub client_id: String,
    #[serde(default)]
    pub designer_id: Option<String>,
    pub status: String,
}

impl From<&Project> for ProjectRow {
    fn from(project: &Project) -> Self {
        Self {
            id: *project.id.as_uuid(),
            title: project.title.as_ref().to_owned(),
            description: project.description.as_ref().to_owned(),
            files: Some(project.files.clone()),
            created_at: project.created_at,
            updated_at: project.updated_at,
            client_id: project.client_id.to_string(),
            designer_id: project.designer_id.as_ref().map(ToString::to_string),
            status: project.status.as_str().to_owned(),
        }
    }
}

impl TryFrom<ProjectRow> for Project {
    type Error = String;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ProjectId::from_uuid(row.id),
            title: ProjectTitle::new(&row.title).map_err(|err| err.to_string())?,
            description: ProjectDescription::new(&row.description)
                .map_err(|err| err.to_string())?,
            files: row.files.unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
            client_id: UserId::new(&row.client_id).map_err(|err| err.to_string())?,
            designer_id: row
                .designer_id
                .as_deref()
                .map(UserId::new)
                .transpose()
                .map_err(|err| err.to_string())?,
            status: row
                .status
                .parse::<ProjectStatus>()
                .map_err(|err| err.to_string())?,
        })
    }
}

/// Body of a `PATCH /rest/v1/projects`; absent fields are left untouched.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub(super) struct ProjectPatchRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&ProjectPatch> for ProjectPatchRow {
    fn from(patch: &ProjectPatch) -> Self {
        Self {
            title: patch.title.as_ref().map(|t| t.as_ref().to_owned()),
            description: patch.description.as_ref().map(|d| d.as_ref().to_owned()),
            files: patch.files.clone(),
            status: patch.status.map(ProjectStatus::as_str),
            designer_id: patch.designer_id.as_ref().map(ToString::to_string),
            updated_at: patch.updated_at,
        }
    }
}
