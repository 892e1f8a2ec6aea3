//! User profile repository over the PostgREST `users` table.

use async_trait::async_trait;
use reqwest::Method;

use super::client::{CallFailure, SupabaseClient, decode_json};
use super::dto::UserRow;
use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{Role, User, UserId};

const USERS_PATH: &str = "rest/v1/users";

/// [`UserRepository`] backed by the hosted `users` table.
#[derive(Clone)]
pub struct SupabaseUserRepository {
    client: SupabaseClient,
}

impl SupabaseUserRepository {
    /// Adapter sharing `client` with the other Supabase adapters.
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    async fn fetch_rows(&self, query: &[(&str, &str)]) -> Result<Vec<User>, UserRepositoryError> {
        let mut url = self.client.endpoint(USERS_PATH).map_err(map_failure)?;
        url.query_pairs_mut().extend_pairs(query);
        let bytes = self
            .client
            .send(self.client.request(Method::GET, url))
            .await
            .map_err(map_failure)?;
        let rows: Vec<UserRow> = decode_json(&bytes).map_err(UserRepositoryError::query)?;
        rows.into_iter()
            .map(|row| User::try_from(row).map_err(UserRepositoryError::query))
            .collect()
    }
}

fn map_failure(failure: CallFailure) -> UserRepositoryError {
    match failure {
        CallFailure::Transport { message } => UserRepositoryError::connection(message),
        CallFailure::Status { message, .. } => UserRepositoryError::query(message),
    }
}

#[async_trait]
impl UserRepository for SupabaseUserRepository {
    async fn upsert(&self, user: &User) -> Result<(), UserRepositoryError> {
        let url = self.client.endpoint(USERS_PATH).map_err(map_failure)?;
        let request = self
            .client
            .request(Method::POST, url)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&UserRow::from(user));
        self.client.send(request).await.map_err(map_failure)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let filter = format!("eq.{id}");
        let users = self
            .fetch_rows(&[("select", "*"), ("id", filter.as_str()), ("limit", "1")])
            .await?;
        Ok(users.into_iter().next())
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, UserRepositoryError> {
        let filter = format!("eq.{}", role.as_str());
        self.fetch_rows(&[
            ("select", "*"),
            ("role", filter.as_str()),
            ("order", "email.asc"),
        ])
        .await
    }
}
