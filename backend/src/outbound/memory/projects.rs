//! In-memory `projects` table.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::ports::{ProjectRepository, ProjectRepositoryError};
use crate::domain::{Project, ProjectId, ProjectPatch, ProjectScope};

use super::poisoned;

/// Project repository backed by a map keyed by project id.
///
/// Updates apply the patch to whatever is stored at the time of the write,
/// so concurrent writers resolve as last write wins.
#[derive(Default)]
pub struct MemoryProjectRepository {
    projects: RwLock<HashMap<ProjectId, Project>>,
}

fn lock_error() -> ProjectRepositoryError {
    ProjectRepositoryError::connection(poisoned("project repository"))
}

#[async_trait]
impl ProjectRepository for MemoryProjectRepository {
    async fn list(&self, scope: &ProjectScope) -> Result<Vec<Project>, ProjectRepositoryError> {
        let projects = self.projects.read().map_err(|_| lock_error())?;
        let mut visible: Vec<Project> = projects
            .values()
            .filter(|project| scope.includes(project))
            .cloned()
            .collect();
        visible.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(visible)
    }

    async fn find(&self, id: &ProjectId) -> Result<Option<Project>, ProjectRepositoryError> {
        Ok(self.projects.read().map_err(|_| lock_error())?.get(id).cloned())
    }

    async fn insert(&self, project: &Project) -> Result<Project, ProjectRepositoryError> {
        self.projects
            .write()
            .map_err(|_| lock_error())?
            .insert(project.id, project.clone());
        Ok(project.clone())
    }

    async fn update(
        &self,
        id: &ProjectId,
        patch: &ProjectPatch,
    ) -> Result<(), ProjectRepositoryError> {
        let mut projects = self.projects.write().map_err(|_| lock_error())?;
        let project = projects
            .get_mut(id)
            .ok_or_else(|| ProjectRepositoryError::not_found(id.to_string()))?;
        patch.apply_to(project);
        Ok(())
    }

    async fn delete(&self, id: &ProjectId) -> Result<(), ProjectRepositoryError> {
        self.projects
            .write()
            .map_err(|_| lock_error())?
            .remove(id)
            .map(drop)
            .ok_or_else(|| ProjectRepositoryError::not_found(id.to_string()))
    }
}
