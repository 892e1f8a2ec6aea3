//! In-memory auth service with password accounts and opaque tokens.
//!
//! Sign-in issues an access token plus a single-use refresh token. Signing
//! out revokes the access token and every refresh token of that account.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::domain::ports::{AuthProvider, AuthProviderError};
use crate::domain::{
    AccessToken, AuthIdentity, AuthSession, Email, LoginCredentials, RefreshToken, Registration,
    UserId,
};

use super::poisoned;

struct Account {
    id: UserId,
    email: Email,
    password: Zeroizing<String>,
}

#[derive(Default)]
struct AuthStore {
    accounts: HashMap<String, Account>,
    tokens: HashMap<String, UserId>,
    refresh_tokens: HashMap<String, UserId>,
}

impl AuthStore {
    fn identity_of(&self, id: &UserId) -> Option<AuthIdentity> {
        self.accounts
            .values()
            .find(|account| &account.id == id)
            .map(|account| AuthIdentity {
                id: account.id.clone(),
                email: account.email.clone(),
            })
    }

    fn issue_session(&mut self, identity: AuthIdentity) -> AuthSession {
        let access = Uuid::new_v4().simple().to_string();
        let refresh = Uuid::new_v4().simple().to_string();
        self.tokens.insert(access.clone(), identity.id.clone());
        self.refresh_tokens
            .insert(refresh.clone(), identity.id.clone());
        AuthSession {
            identity,
            access_token: AccessToken::new(access),
            refresh_token: Some(RefreshToken::new(refresh)),
        }
    }
}

/// Auth provider keeping accounts and issued tokens in memory.
#[derive(Default)]
pub struct MemoryAuthProvider {
    store: RwLock<AuthStore>,
}

impl MemoryAuthProvider {
    fn unavailable() -> AuthProviderError {
        AuthProviderError::unavailable(poisoned("auth store"))
    }

    /// Invalidate every issued access token, leaving refresh tokens usable.
    #[cfg(test)]
    pub(crate) fn expire_access_tokens(&self) {
        if let Ok(mut store) = self.store.write() {
            store.tokens.clear();
        }
    }
}

#[async_trait]
impl AuthProvider for MemoryAuthProvider {
    async fn sign_up(&self, registration: &Registration) -> Result<AuthIdentity, AuthProviderError> {
        let credentials = registration.credentials();
        let email = credentials.email().clone();
        let mut store = self.store.write().map_err(|_| Self::unavailable())?;
        if store.accounts.contains_key(email.as_ref()) {
            return Err(AuthProviderError::email_taken(email.as_ref()));
        }
        let id = UserId::random();
        store.accounts.insert(
            email.as_ref().to_owned(),
            Account {
                id: id.clone(),
                email: email.clone(),
                password: Zeroizing::new(credentials.password().to_owned()),
            },
        );
        debug!(user_id = %id, "memory account created");
        Ok(AuthIdentity { id, email })
    }

    async fn sign_in(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthSession, AuthProviderError> {
        let mut store = self.store.write().map_err(|_| Self::unavailable())?;
        let identity = store
            .accounts
            .get(credentials.email().as_ref())
            .filter(|account| account.password.as_str() == credentials.password())
            .map(|account| AuthIdentity {
                id: account.id.clone(),
                email: account.email.clone(),
            })
            .ok_or_else(AuthProviderError::invalid_credentials)?;
        Ok(store.issue_session(identity))
    }

    async fn refresh_session(
        &self,
        refresh_token: &RefreshToken,
    ) -> Result<AuthSession, AuthProviderError> {
        let mut store = self.store.write().map_err(|_| Self::unavailable())?;
        let id = store
            .refresh_tokens
            .remove(refresh_token.expose())
            .ok_or_else(AuthProviderError::invalid_token)?;
        let identity = store
            .identity_of(&id)
            .ok_or_else(AuthProviderError::invalid_token)?;
        Ok(store.issue_session(identity))
    }

    async fn sign_out(&self, token: &AccessToken) -> Result<(), AuthProviderError> {
        let mut store = self.store.write().map_err(|_| Self::unavailable())?;
        if let Some(id) = store.tokens.remove(token.expose()) {
            store.refresh_tokens.retain(|_, owner| owner != &id);
        }
        Ok(())
    }

    async fn current_user(
        &self,
        token: &AccessToken,
    ) -> Result<Option<AuthIdentity>, AuthProviderError> {
        let store = self.store.read().map_err(|_| Self::unavailable())?;
        let Some(id) = store.tokens.get(token.expose()) else {
            return Err(AuthProviderError::invalid_token());
        };
        Ok(store.identity_of(id))
    }
}
