//! Account use-cases: registration, login, logout and the designer roster.
//!
//! Registration is the only place user records are written: the auth
//! service creates the identity, then exactly one profile upsert mirrors it
//! into the `users` collection.

use std::sync::Arc;

use tracing::info;

use super::ports::{AuthProvider, UserRepository};
use super::{AuthEvent, Error, LoginCredentials, Registration, Role, SessionGate, User};

/// Account service over the auth and user ports.
#[derive(Clone)]
pub struct AccountService {
    auth: Arc<dyn AuthProvider>,
    users: Arc<dyn UserRepository>,
}

impl AccountService {
    /// Service over the auth service and the user collection.
    pub fn new(auth: Arc<dyn AuthProvider>, users: Arc<dyn UserRepository>) -> Self {
        Self { auth, users }
    }

    /// Sign up and provision the application record.
    pub async fn register(&self, registration: &Registration) -> Result<User, Error> {
        let identity = self.auth.sign_up(registration).await?;
        let user = User::new(
            identity.id,
            registration.credentials().email().clone(),
            registration.role(),
            registration.full_name().cloned(),
        );
        self.users.upsert(&user).await?;
        info!(user_id = %user.id(), role = %user.role(), "account registered");
        Ok(user)
    }

    /// Sign in and resolve the identity through `gate`.
    pub async fn login(
        &self,
        gate: &mut SessionGate,
        credentials: &LoginCredentials,
    ) -> Result<User, Error> {
        let session = self.auth.sign_in(credentials).await?;
        gate.apply(AuthEvent::SignedIn(session)).await?;
        gate.require_identity()
            .cloned()
            .map_err(|_| Error::unauthorized("account has no user profile"))
    }

    /// Sign out through `gate`.
    pub async fn logout(&self, gate: &mut SessionGate) -> Result<(), Error> {
        gate.sign_out().await
    }

    /// Designers available for assignment. Project managers only.
    pub async fn designers(&self, caller: &User) -> Result<Vec<User>, Error> {
        if caller.role() != Role::ProjectManager {
            return Err(Error::forbidden("only project managers list designers"));
        }
        Ok(self.users.list_by_role(Role::Designer).await?)
    }
}
