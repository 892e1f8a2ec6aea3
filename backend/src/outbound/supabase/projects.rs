//! Project repository over the PostgREST `projects` table.
//!
//! Scopes translate into column filters; the domain has already decided
//! which scope applies to the caller.

use async_trait::async_trait;
use reqwest::Method;

use super::client::{CallFailure, SupabaseClient, decode_json};
use super::dto::{ProjectPatchRow, ProjectRow};
use crate::domain::ports::{ProjectRepository, ProjectRepositoryError};
use crate::domain::{Project, ProjectId, ProjectPatch, ProjectScope};

const PROJECTS_PATH: &str = "rest/v1/projects";
const RETURN_REPRESENTATION: &str = "return=representation";

/// [`ProjectRepository`] backed by the hosted `projects` table.
#[derive(Clone)]
pub struct SupabaseProjectRepository {
    client: SupabaseClient,
}

impl SupabaseProjectRepository {
    /// Adapter sharing `client` with the other Supabase adapters.
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    fn url(&self, query: &[(&str, String)]) -> Result<reqwest::Url, ProjectRepositoryError> {
        let mut url = self.client.endpoint(PROJECTS_PATH).map_err(map_failure)?;
        url.query_pairs_mut()
            .extend_pairs(query.iter().map(|(key, value)| (*key, value.as_str())));
        Ok(url)
    }

    async fn rows(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Vec<Project>, ProjectRepositoryError> {
        let bytes = self.client.send(request).await.map_err(map_failure)?;
        let rows: Vec<ProjectRow> = decode_json(&bytes).map_err(ProjectRepositoryError::query)?;
        rows.into_iter()
            .map(|row| Project::try_from(row).map_err(ProjectRepositoryError::query))
            .collect()
    }
}

fn map_failure(failure: CallFailure) -> ProjectRepositoryError {
    match failure {
        CallFailure::Transport { message } => ProjectRepositoryError::connection(message),
        CallFailure::Status { message, .. } => ProjectRepositoryError::query(message),
    }
}

/// PostgREST filter pairs for a scope.
fn scope_filter(scope: &ProjectScope) -> Vec<(&'static str, String)> {
    match scope {
        ProjectScope::All => Vec::new(),
        ProjectScope::OwnedBy(id) => vec![("client_id", format!("eq.{id}"))],
        ProjectScope::AssignedTo(id) => vec![("designer_id", format!("eq.{id}"))],
    }
}

fn id_filter(id: &ProjectId) -> (&'static str, String) {
    ("id", format!("eq.{id}"))
}

#[async_trait]
impl ProjectRepository for SupabaseProjectRepository {
    async fn list(&self, scope: &ProjectScope) -> Result<Vec<Project>, ProjectRepositoryError> {
        let mut query = vec![
            ("select", "*".to_owned()),
            ("order", "created_at.desc".to_owned()),
        ];
        query.extend(scope_filter(scope));
        let url = self.url(&query)?;
        self.rows(self.client.request(Method::GET, url)).await
    }

    async fn find(&self, id: &ProjectId) -> Result<Option<Project>, ProjectRepositoryError> {
        let url = self.url(&[("select", "*".to_owned()), id_filter(id)])?;
        let projects = self.rows(self.client.request(Method::GET, url)).await?;
        Ok(projects.into_iter().next())
    }

    async fn insert(&self, project: &Project) -> Result<Project, ProjectRepositoryError> {
        let url = self.url(&[])?;
        let request = self
            .client
            .request(Method::POST, url)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&ProjectRow::from(project));
        self.rows(request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ProjectRepositoryError::query("insert returned no row"))
    }

    async fn update(
        &self,
        id: &ProjectId,
        patch: &ProjectPatch,
    ) -> Result<(), ProjectRepositoryError> {
        let url = self.url(&[id_filter(id)])?;
        let request = self
            .client
            .request(Method::PATCH, url)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&ProjectPatchRow::from(patch));
        if self.rows(request).await?.is_empty() {
            return Err(ProjectRepositoryError::not_found(id.to_string()));
        }
        Ok(())
    }

    async fn delete(&self, id: &ProjectId) -> Result<(), ProjectRepositoryError> {
        let url = self.url(&[id_filter(id)])?;
        let request = self
            .client
            .request(Method::DELETE, url)
            .header("Prefer", RETURN_REPRESENTATION);
        if self.rows(request).await?.is_empty() {
            return Err(ProjectRepositoryError::not_found(id.to_string()));
        }
        Ok(())
    }
}
