//! Port abstraction for the application `users` collection.

use async_trait::async_trait;

use crate::domain::{Role, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => ServiceUnavailable,
            "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => InternalError, "user repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert or update a user record keyed by id.
    async fn upsert(&self, user: &User) -> Result<(), UserRepositoryError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Every user holding `role`.
    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, UserRepositoryError>;
}
