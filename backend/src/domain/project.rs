//! Design project aggregate and the values used to create, patch and scope it.
//!
//! Status only ever moves forward: `pending → in_progress → completed`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::auth::sanitize_text;
use super::{Error, field_error};
use super::user::{Role, User, UserId};

/// Maximum title length in characters.
pub const PROJECT_TITLE_MAX: usize = 200;
/// Maximum description length in characters.
pub const PROJECT_DESCRIPTION_MAX: usize = 10_000;

/// Validation errors for project values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProjectValidationError {
    #[error("project id must be a valid UUID")]
    InvalidId,
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("title must be at most {max} characters")]
    TitleTooLong { max: usize },
    #[error("description must not be empty")]
    EmptyDescription,
    #[error("description must be at most {max} characters")]
    DescriptionTooLong { max: usize },
    #[error("file references must not be empty")]
    EmptyFileReference,
    #[error("unknown project status")]
    UnknownStatus,
    #[error("status cannot move from {from} back to {to}")]
    BackwardTransition { from: ProjectStatus, to: ProjectStatus },
    #[error("patch does not change any field")]
    EmptyPatch,
}

impl ProjectValidationError {
    /// Form field the error relates to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidId => "id",
            Self::EmptyTitle | Self::TitleTooLong { .. } => "title",
            Self::EmptyDescription | Self::DescriptionTooLong { .. } => "description",
            Self::EmptyFileReference => "files",
            Self::UnknownStatus | Self::BackwardTransition { .. } => "status",
            Self::EmptyPatch => "body",
        }
    }

    /// Stable machine-readable reason.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidId => "invalid_uuid",
            Self::EmptyTitle | Self::EmptyDescription | Self::EmptyFileReference => {
                "missing_field"
            }
            Self::TitleTooLong { .. } | Self::DescriptionTooLong { .. } => "too_long",
            Self::UnknownStatus => "unknown_status",
            Self::BackwardTransition { .. } => "backward_transition",
            Self::EmptyPatch => "empty_patch",
        }
    }
}

impl From<ProjectValidationError> for Error {
    fn from(value: ProjectValidationError) -> Self {
        field_error(value.field(), value.code(), value.to_string())
    }
}

/// Project identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(Uuid);

impl ProjectId {
    /// Fresh random (v4) identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for ProjectId {
    type Err = ProjectValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| ProjectValidationError::InvalidId)
    }
}

/// Workflow status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Awaiting a designer.
    Pending,
    /// Assigned and being worked on.
    InProgress,
    /// Delivered by the assigned designer.
    Completed,
}

impl ProjectStatus {
    /// Every status in workflow order.
    pub const ALL: [ProjectStatus; 3] = [Self::Pending, Self::InProgress, Self::Completed];

    fn rank(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::InProgress => 1,
            Self::Completed => 2,
        }
    }

    /// Whether moving to `next` keeps the workflow monotonic. Staying put is
    /// allowed.
    ///
    /// # Examples
    /// ```
    /// use designdesk::domain::ProjectStatus;
    ///
    /// assert!(ProjectStatus::Pending.can_advance_to(ProjectStatus::InProgress));
    /// assert!(!ProjectStatus::Completed.can_advance_to(ProjectStatus::Pending));
    /// ```
    pub fn can_advance_to(self, next: ProjectStatus) -> bool {
        next.rank() >= self.rank()
    }

    /// Wire and storage name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = ProjectValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or(ProjectValidationError::UnknownStatus)
    }
}

/// Sanitised, non-empty project title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectTitle(String);

impl ProjectTitle {
    /// Sanitise `raw` and check it is non-empty and within the length limit.
    pub fn new(raw: &str) -> Result<Self, ProjectValidationError> {
        let value = sanitize_text(raw);
        if value.is_empty() {
            return Err(ProjectValidationError::EmptyTitle);
        }
        if value.chars().count() > PROJECT_TITLE_MAX {
            return Err(ProjectValidationError::TitleTooLong {
                max: PROJECT_TITLE_MAX,
            });
        }
        Ok(Self(value))
    }
}

impl AsRef<str> for ProjectTitle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<ProjectTitle> for String {
    fn from(value: ProjectTitle) -> Self {
        value.0
    }
}

impl TryFrom<String> for ProjectTitle {
    type Error = ProjectValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

/// Sanitised, non-empty project description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectDescription(String);

impl ProjectDescription {
    /// Sanitise `raw` and check it is non-empty and within the length limit.
    pub fn new(raw: &str) -> Result<Self, ProjectValidationError> {
        let value = sanitize_text(raw);
        if value.is_empty() {
            return Err(ProjectValidationError::EmptyDescription);
        }
        if value.chars().count() > PROJECT_DESCRIPTION_MAX {
            return Err(ProjectValidationError::DescriptionTooLong {
                max: PROJECT_DESCRIPTION_MAX,
            });
        }
        Ok(Self(value))
    }
}

impl AsRef<str> for ProjectDescription {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<ProjectDescription> for String {
    fn from(value: ProjectDescription) -> Self {
        value.0
    }
}

impl TryFrom<String> for ProjectDescription {
    type Error = ProjectValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

fn validate_files(files: Vec<String>) -> Result<Vec<String>, ProjectValidationError> {
    files
        .into_iter()
        .map(|file| {
            let trimmed = file.trim();
            if trimmed.is_empty() {
                Err(ProjectValidationError::EmptyFileReference)
            } else {
                Ok(trimmed.to_owned())
            }
        })
        .collect()
}

/// Design project record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Stable identifier.
    #[schema(value_type = String, format = Uuid)]
    pub id: ProjectId,
    /// Short project name.
    #[schema(value_type = String, example = "Brand refresh")]
    pub title: ProjectTitle,
    /// Brief written by the client.
    #[schema(value_type = String, example = "New logo and palette")]
    pub description: ProjectDescription,
    /// Ordered attachment URLs.
    pub files: Vec<String>,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Instant of the last accepted change.
    pub updated_at: DateTime<Utc>,
    /// Owning client.
    #[schema(value_type = String, format = Uuid)]
    pub client_id: UserId,
    /// Assigned designer, if any.
    #[schema(value_type = Option<String>, format = Uuid)]
    pub designer_id: Option<UserId>,
    /// Workflow status; only moves forward.
    pub status: ProjectStatus,
}

/// Validated input for creating a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    /// Project name.
    pub title: ProjectTitle,
    /// Project brief.
    pub description: ProjectDescription,
    /// Attachment URLs, in upload order.
    pub files: Vec<String>,
}

impl ProjectDraft {
    /// Sanitise and validate raw form values.
    pub fn try_from_parts(
        title: &str,
        description: &str,
        files: Vec<String>,
    ) -> Result<Self, ProjectValidationError> {
        Ok(Self {
            title: ProjectTitle::new(title)?,
            description: ProjectDescription::new(description)?,
            files: validate_files(files)?,
        })
    }

    /// Materialise the draft as a new pending project owned by `owner`.
    pub fn into_project(self, owner: UserId, now: DateTime<Utc>) -> Project {
        Project {
            id: ProjectId::random(),
            title: self.title,
            description: self.description,
            files: self.files,
            created_at: now,
            updated_at: now,
            client_id: owner,
            designer_id: None,
            status: ProjectStatus::Pending,
        }
    }
}

/// Partial update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch {
    /// New title.
    pub title: Option<ProjectTitle>,
    /// New description.
    pub description: Option<ProjectDescription>,
    /// Replacement attachment list.
    pub files: Option<Vec<String>>,
    /// Target status; must not move backwards.
    pub status: Option<ProjectStatus>,
    /// Designer to assign.
    pub designer_id: Option<UserId>,
    /// Timestamp stamped by the workspace clock.
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProjectPatch {
    /// Build a content-only patch from raw form values.
    pub fn content(
        title: Option<&str>,
        description: Option<&str>,
        files: Option<Vec<String>>,
    ) -> Result<Self, ProjectValidationError> {
        let patch = Self {
            title: title.map(ProjectTitle::new).transpose()?,
            description: description.map(ProjectDescription::new).transpose()?,
            files: files.map(validate_files).transpose()?,
            ..Self::default()
        };
        if patch.title.is_none() && patch.description.is_none() && patch.files.is_none() {
            return Err(ProjectValidationError::EmptyPatch);
        }
        Ok(patch)
    }

    /// Whether the patch changes status or assignment.
    pub fn touches_workflow(&self) -> bool {
        self.status.is_some() || self.designer_id.is_some()
    }

    /// Reject patches that would move `current` backwards.
    pub fn check_transition(&self, current: ProjectStatus) -> Result<(), ProjectValidationError> {
        match self.status {
            Some(next) if !current.can_advance_to(next) => {
                Err(ProjectValidationError::BackwardTransition { from: current, to: next })
            }
            _ => Ok(()),
        }
    }

    /// Shallow-merge the patch into `project`.
    pub fn apply_to(&self, project: &mut Project) {
        if let Some(title) = &self.title {
            project.title = title.clone();
        }
        if let Some(description) = &self.description {
            project.description = description.clone();
        }
        if let Some(files) = &self.files {
            project.files = files.clone();
        }
        if let Some(status) = self.status {
            project.status = status;
        }
        if let Some(designer_id) = &self.designer_id {
            project.designer_id = Some(designer_id.clone());
        }
        if let Some(updated_at) = self.updated_at {
            project.updated_at = updated_at;
        }
    }
}

/// Which projects a user may see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectScope {
    /// Projects owned by this client.
    OwnedBy(UserId),
    /// Projects assigned to this designer.
    AssignedTo(UserId),
    /// Every project.
    All,
}

impl ProjectScope {
    /// Scope derived from the user's role.
    ///
    /// # Examples
    /// ```
    /// use designdesk::domain::{Email, ProjectScope, Role, User, UserId};
    ///
    /// let manager = User::new(
    ///     UserId::random(),
    ///     Email::new("pm@studio.io").unwrap(),
    ///     Role::ProjectManager,
    ///     None,
    /// );
    /// assert_eq!(ProjectScope::for_user(&manager), ProjectScope::All);
    /// ```
    pub fn for_user(user: &User) -> Self {
        match user.role() {
            Role::Client => Self::OwnedBy(user.id().clone()),
            Role::Designer => Self::AssignedTo(user.id().clone()),
            Role::ProjectManager => Self::All,
        }
    }

    /// Whether `project` falls inside this scope.
    pub fn includes(&self, project: &Project) -> bool {
        match self {
            Self::OwnedBy(owner) => &project.client_id == owner,
            Self::AssignedTo(designer) => project.designer_id.as_ref() == Some(designer),
            Self::All => true,
        }
    }
}

/// Project counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusSummary {
    /// Projects awaiting a designer.
    pub pending: usize,
    /// Projects being worked on.
    pub in_progress: usize,
    /// Delivered projects.
    pub completed: usize,
    /// All visible projects.
    pub total: usize,
}

impl<'a> FromIterator<&'a Project> for StatusSummary {
    fn from_iter<I: IntoIterator<Item = &'a Project>>(iter: I) -> Self {
        iter.into_iter().fold(Self::default(), |mut summary, project| {
            match project.status {
                ProjectStatus::Pending => summary.pending += 1,
                ProjectStatus::InProgress => summary.in_progress += 1,
                ProjectStatus::Completed => summary.completed += 1,
            }
            summary.total += 1;
            summary
        })
    }
}
