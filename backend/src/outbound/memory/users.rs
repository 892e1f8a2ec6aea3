//! In-memory `users` collection.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{Role, User, UserId};

use super::poisoned;

/// User repository backed by a map keyed by user id.
#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl MemoryUserRepository {
    /// Repository pre-populated with `users`.
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: RwLock::new(users.into_iter().map(|user| (user.id().clone(), user)).collect()),
        }
    }

    /// Number of stored profiles; a poisoned lock counts as empty.
    pub fn len(&self) -> usize {
        self.users.read().map_or(0, |users| users.len())
    }

    /// Whether no profile is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lock_error() -> UserRepositoryError {
    UserRepositoryError::connection(poisoned("user repository"))
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn upsert(&self, user: &User) -> Result<(), UserRepositoryError> {
        self.users
            .write()
            .map_err(|_| lock_error())?
            .insert(user.id().clone(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.users.read().map_err(|_| lock_error())?.get(id).cloned())
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, UserRepositoryError> {
        let users = self.users.read().map_err(|_| lock_error())?;
        let mut matching: Vec<User> = users
            .values()
            .filter(|user| user.role() == role)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.email().as_ref().cmp(b.email().as_ref()));
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Email;
    use rstest::rstest;

    fn user(email: &str, role: Role) -> User {
        User::new(
            UserId::random(),
            Email::new(email).expect("valid email"),
            role,
            None,
        )
    }

    #[rstest]
    #[tokio::test]
    async fn upsert_replaces_existing_record() {
        let original = user("lee@studio.io", Role::Client);
        let repo = MemoryUserRepository::with_users([original.clone()]);
        let promoted = User::new(
            original.id().clone(),
            original.email().clone(),
            Role::Designer,
            None,
        );

        repo.upsert(&promoted).await.expect("upsert");

        let found = repo.find_by_id(original.id()).await.expect("lookup");
        assert_eq!(found, Some(promoted));
    }

    #[rstest]
    #[tokio::test]
    async fn lists_only_the_requested_role_sorted_by_email() {
        let repo = MemoryUserRepository::with_users([
            user("zoe@studio.io", Role::Designer),
            user("ana@studio.io", Role::Client),
            user("bea@studio.io", Role::Designer),
        ]);

        let designers = repo.list_by_role(Role::Designer).await.expect("list");

        let emails: Vec<&str> = designers.iter().map(|u| u.email().as_ref()).collect();
        assert_eq!(emails, ["bea@studio.io", "zoe@studio.io"]);
    }
}
