//! Port for project persistence.
//!
//! Writes are independent round-trips: there is no optimistic concurrency
//! check, so concurrent updates resolve as last write wins at the store.

use async_trait::async_trait;

use crate::domain::{Project, ProjectId, ProjectPatch, ProjectScope};

use super::define_port_error;

define_port_error! {
    /// Errors raised by project repository adapters.
    pub enum ProjectRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => ServiceUnavailable,
            "project repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => InternalError,
            "project repository query failed: {message}",
        /// No row matched the identifier.
        NotFound { id: String } => NotFound, "project {id} not found",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Projects inside `scope`, in no particular order.
    async fn list(&self, scope: &ProjectScope) -> Result<Vec<Project>, ProjectRepositoryError>;

    /// Fetch a single project.
    async fn find(&self, id: &ProjectId) -> Result<Option<Project>, ProjectRepositoryError>;

    /// Persist a new project and return the stored record.
    async fn insert(&self, project: &Project) -> Result<Project, ProjectRepositoryError>;

    /// Apply `patch` to the stored record.
    async fn update(&self, id: &ProjectId, patch: &ProjectPatch)
    -> Result<(), ProjectRepositoryError>;

    /// Remove the record.
    async fn delete(&self, id: &ProjectId) -> Result<(), ProjectRepositoryError>;
}
