//! Project workspace: role-scoped listing and mutations with a local cache.
//!
//! The workspace is bound to the identity resolved by the session gate. Every
//! operation is a single round-trip; the cache is only touched after the
//! repository confirms the write. Concurrent writers are not reconciled: the
//! last write to reach the store wins and the cache may lag behind it.

use std::sync::Arc;

use mockable::Clock;
use tracing::{info, warn};

use super::ports::{ProjectRepository, UserRepository};
use super::{
    Error, Project, ProjectDraft, ProjectId, ProjectPatch, ProjectScope, ProjectStatus, Role,
    StatusSummary, User, UserId,
};

/// Stateful project workspace for one identity.
pub struct ProjectWorkspace {
    identity: Option<User>,
    projects: Arc<dyn ProjectRepository>,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
    cache: Vec<Project>,
    last_error: Option<String>,
}

impl ProjectWorkspace {
    /// Bind a workspace to `identity`.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use designdesk::domain::ProjectWorkspace;
    /// use designdesk::outbound::memory::{MemoryProjectRepository, MemoryUserRepository};
    /// use mockable::DefaultClock;
    ///
    /// let workspace = ProjectWorkspace::new(
    ///     None,
    ///     Arc::new(MemoryProjectRepository::default()),
    ///     Arc::new(MemoryUserRepository::default()),
    ///     Arc::new(DefaultClock),
    /// );
    /// assert!(workspace.projects().is_empty());
    /// ```
    pub fn new(
        identity: Option<User>,
        projects: Arc<dyn ProjectRepository>,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            identity,
            projects,
            users,
            clock,
            cache: Vec::new(),
            last_error: None,
        }
    }

    /// Cached projects.
    pub fn projects(&self) -> &[Project] {
        &self.cache
    }

    /// Message of the most recent backend failure.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Counts of cached projects per status.
    pub fn summary(&self) -> StatusSummary {
        self.cache.iter().collect()
    }

    /// Load the projects visible to the identity into the cache.
    ///
    /// Anonymous workspaces stay empty without querying the store.
    pub async fn list(&mut self) -> Result<&[Project], Error> {
        let Some(identity) = &self.identity else {
            self.cache.clear();
            return Ok(&self.cache);
        };
        let scope = ProjectScope::for_user(identity);
        let listed = self.projects.list(&scope).await;
        let projects = self.record(listed)?;
        self.last_error = None;
        self.cache = projects;
        Ok(&self.cache)
    }

    /// Fetch one project visible to the identity.
    pub async fn get(&mut self, id: &ProjectId) -> Result<Project, Error> {
        let identity = self.require_identity()?.clone();
        self.visible(&identity, id).await
    }

    /// Create a pending project owned by the identity.
    pub async fn create(&mut self, draft: ProjectDraft) -> Result<Project, Error> {
        let identity = self.require_identity()?;
        if !matches!(identity.role(), Role::Client | Role::ProjectManager) {
            return Err(Error::forbidden("only clients and project managers create projects"));
        }
        let project = draft.into_project(identity.id().clone(), self.clock.utc());
        let inserted = self.projects.insert(&project).await;
        let created = self.record(inserted)?;
        info!(project_id = %created.id, "project created");
        self.cache.push(created.clone());
        Ok(created)
    }

    /// Apply a partial update and merge it into the cached record.
    ///
    /// Content fields may be edited by project managers and by the owning
    /// client. Status and assignment changes are reserved to managers and
    /// must move the workflow forward.
    pub async fn update(&mut self, id: &ProjectId, patch: ProjectPatch) -> Result<Project, Error> {
        let identity = self.require_identity()?.clone();
        let current = self.visible(&identity, id).await?;
        if patch.touches_workflow() && identity.role() != Role::ProjectManager {
            return Err(Error::forbidden("only project managers change status or assignment"));
        }
        self.ensure_editable(&current)?;
        self.commit(current, patch).await
    }

    /// Append attachment URLs to a project's file list.
    pub async fn attach_files(&mut self, id: &ProjectId, urls: Vec<String>) -> Result<Project, Error> {
        let identity = self.require_identity()?.clone();
        let current = self.visible(&identity, id).await?;
        self.ensure_editable(&current)?;
        let mut files = current.files.clone();
        files.extend(urls);
        let patch = ProjectPatch {
            files: Some(files),
            ..ProjectPatch::default()
        };
        self.commit(current, patch).await
    }

    /// Whether the identity may edit the content of `project`.
    pub fn ensure_editable(&self, project: &Project) -> Result<(), Error> {
        let identity = self.require_identity()?;
        let may_edit = match identity.role() {
            Role::ProjectManager => true,
            Role::Client => project.client_id == *identity.id(),
            Role::Designer => false,
        };
        if may_edit {
            Ok(())
        } else {
            Err(Error::forbidden("not allowed to edit this project"))
        }
    }

    /// Delete a project. Project managers only.
    pub async fn delete(&mut self, id: &ProjectId) -> Result<(), Error> {
        let identity = self.require_identity()?.clone();
        self.visible(&identity, id).await?;
        if identity.role() != Role::ProjectManager {
            return Err(Error::forbidden("only project managers delete projects"));
        }
        let deleted = self.projects.delete(id).await;
        self.record(deleted)?;
        info!(project_id = %id, "project deleted");
        self.cache.retain(|project| project.id != *id);
        Ok(())
    }

    /// Assign a designer and move the project to `in_progress`.
    pub async fn assign_designer(
        &mut self,
        id: &ProjectId,
        designer_id: &UserId,
    ) -> Result<Project, Error> {
        let identity = self.require_identity()?.clone();
        if identity.role() != Role::ProjectManager {
            return Err(Error::forbidden("only project managers assign designers"));
        }
        let current = self.visible(&identity, id).await?;
        if current.status == ProjectStatus::Completed {
            return Err(Error::conflict("completed projects cannot be reassigned"));
        }
        let lookup = self.users.find_by_id(designer_id).await;
        let designer = self.record(lookup)?;
        if designer.as_ref().map(User::role) != Some(Role::Designer) {
            return Err(Error::invalid_request("assignee must be a designer").with_details(
                serde_json::json!({ "field": "designerId", "code": "not_a_designer" }),
            ));
        }
        let patch = ProjectPatch {
            designer_id: Some(designer_id.clone()),
            status: Some(ProjectStatus::InProgress),
            ..ProjectPatch::default()
        };
        self.commit(current, patch).await
    }

    /// Mark a project completed. Only its assigned designer may do this.
    pub async fn mark_completed(&mut self, id: &ProjectId) -> Result<Project, Error> {
        let identity = self.require_identity()?.clone();
        let current = self.visible(&identity, id).await?;
        if current.designer_id.as_ref() != Some(identity.id()) {
            return Err(Error::forbidden("only the assigned designer completes a project"));
        }
        if current.status != ProjectStatus::InProgress {
            return Err(Error::conflict(format!(
                "project is {} and cannot be completed",
                current.status
            )));
        }
        let patch = ProjectPatch {
            status: Some(ProjectStatus::Completed),
            ..ProjectPatch::default()
        };
        self.commit(current, patch).await
    }

    async fn commit(&mut self, mut current: Project, mut patch: ProjectPatch) -> Result<Project, Error> {
        patch.check_transition(current.status)?;
        patch.updated_at = Some(self.clock.utc());
        let updated = self.projects.update(&current.id, &patch).await;
        self.record(updated)?;
        patch.apply_to(&mut current);
        if let Some(cached) = self.cache.iter_mut().find(|p| p.id == current.id) {
            patch.apply_to(cached);
        }
        Ok(current)
    }

    async fn visible(&mut self, identity: &User, id: &ProjectId) -> Result<Project, Error> {
        let found = self.projects.find(id).await;
        match self.record(found)? {
            Some(project) if ProjectScope::for_user(identity).includes(&project) => Ok(project),
            _ => Err(Error::not_found(format!("project {id} not found"))),
        }
    }

    fn require_identity(&self) -> Result<&User, Error> {
        self.identity
            .as_ref()
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Record a backend failure as the last error before propagating it.
    fn record<T, E>(&mut self, result: Result<T, E>) -> Result<T, Error>
    where
        E: Into<Error>,
    {
        result.map_err(|err| {
            let err: Error = err.into();
            warn!(error = %err, "project backend call failed");
            self.last_error = Some(err.message().to_owned());
            err
        })
    }
}

#[cfg(test)]
mod tests;
