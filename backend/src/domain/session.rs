//! Session/identity gate.
//!
//! A [`SessionGate`] is built per request from the tokens carried by the
//! session cookie. It resolves the application [`User`] behind the access
//! token and then applies auth state changes for the rest of its lifetime:
//!
//! ```text
//! new (loading) -> initialise -> [apply(event)]* -> sign_out
//! ```
//!
//! Resolution is read-only. A token whose identity has no application record
//! resolves to no identity; records are provisioned once, at registration.
//! An expired access token is exchanged for a new one when the gate holds a
//! refresh token; the rotation is applied as [`AuthEvent::TokenRefreshed`]
//! and reported by [`SessionGate::tokens_rotated`] so the caller can store
//! the new pair.

use std::sync::Arc;

use tracing::{debug, warn};

use super::ports::{AuthProvider, AuthProviderError, UserRepository};
use super::{AccessToken, AuthSession, Error, RefreshToken, Role, User, UserId};

/// Auth state change notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// A new session was established.
    SignedIn(AuthSession),
    /// The session ended elsewhere.
    SignedOut,
    /// The access token was exchanged for a new pair of tokens.
    TokenRefreshed(AuthSession),
}

/// Point-in-time view of the gate used by route guards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Resolved user, `None` for anonymous visitors.
    pub identity: Option<User>,
    /// True until the initial resolution finishes.
    pub loading: bool,
}

impl SessionSnapshot {
    /// Resolved snapshot with the given identity.
    pub fn resolved(identity: Option<User>) -> Self {
        Self {
            identity,
            loading: false,
        }
    }

    /// Snapshot taken before resolution finished.
    pub fn resolving() -> Self {
        Self {
            identity: None,
            loading: true,
        }
    }

    /// Role of the resolved user.
    pub fn role(&self) -> Option<Role> {
        self.identity.as_ref().map(User::role)
    }
}

/// Per-request session object.
pub struct SessionGate {
    auth: Arc<dyn AuthProvider>,
    users: Arc<dyn UserRepository>,
    token: Option<AccessToken>,
    refresh_token: Option<RefreshToken>,
    identity: Option<User>,
    loading: bool,
    rotated: bool,
}

impl SessionGate {
    /// Create an unresolved gate holding `token`.
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        users: Arc<dyn UserRepository>,
        token: Option<AccessToken>,
    ) -> Self {
        Self {
            auth,
            users,
            token,
            refresh_token: None,
            identity: None,
            loading: true,
            rotated: false,
        }
    }

    /// Hold `refresh_token` for renewing an expired access token.
    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: Option<RefreshToken>) -> Self {
        self.refresh_token = refresh_token;
        self
    }

    /// Resolve the identity behind the held token.
    ///
    /// An expired access token is refreshed once when a refresh token is
    /// held. `loading` is cleared whatever the outcome; a failed lookup
    /// leaves the gate unauthenticated.
    pub async fn initialise(&mut self) -> Result<(), Error> {
        let outcome = self.resolve_initial().await;
        self.loading = false;
        match outcome {
            Ok(identity) => {
                self.identity = identity;
                Ok(())
            }
            Err(err) => {
                self.identity = None;
                Err(err)
            }
        }
    }

    /// Apply an auth state change. On failure the previous state is kept.
    ///
    /// `TokenRefreshed` re-resolves the identity when a user is present or
    /// the initial resolution is still running.
    pub async fn apply(&mut self, event: AuthEvent) -> Result<(), Error> {
        match event {
            AuthEvent::SignedIn(session) => {
                let identity = self.resolve_record(&session.identity.id).await?;
                self.token = Some(session.access_token);
                self.refresh_token = session.refresh_token;
                self.identity = identity;
            }
            AuthEvent::SignedOut => {
                self.token = None;
                self.refresh_token = None;
                self.identity = None;
            }
            AuthEvent::TokenRefreshed(session) => {
                let previous_token = self.token.replace(session.access_token);
                let previous_refresh =
                    std::mem::replace(&mut self.refresh_token, session.refresh_token);
                if self.identity.is_some() || self.loading {
                    match self.resolve_token().await {
                        Ok(identity) => self.identity = identity,
                        Err(err) => {
                            self.token = previous_token;
                            self.refresh_token = previous_refresh;
                            return Err(err);
                        }
                    }
                }
                self.rotated = true;
            }
        }
        Ok(())
    }

    /// Revoke the remote session and clear the identity.
    ///
    /// The identity is cleared even when the auth service fails; its error is
    /// still returned to the caller.
    pub async fn sign_out(&mut self) -> Result<(), Error> {
        self.refresh_token = None;
        let outcome = match self.token.take() {
            Some(token) => self.auth.sign_out(&token).await.map_err(Error::from),
            None => Ok(()),
        };
        self.identity = None;
        if let Err(err) = &outcome {
            warn!(error = %err, "remote sign-out failed; local session cleared");
        }
        outcome
    }

    /// Resolved user, if any.
    pub fn identity(&self) -> Option<&User> {
        self.identity.as_ref()
    }

    /// Role of the resolved user.
    pub fn role(&self) -> Option<Role> {
        self.identity.as_ref().map(User::role)
    }

    /// True until [`Self::initialise`] finishes.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Access token currently held.
    pub fn access_token(&self) -> Option<&AccessToken> {
        self.token.as_ref()
    }

    /// Refresh token currently held.
    pub fn refresh_token(&self) -> Option<&RefreshToken> {
        self.refresh_token.as_ref()
    }

    /// Whether the held tokens were replaced by a refresh and need storing.
    pub fn tokens_rotated(&self) -> bool {
        self.rotated
    }

    /// Current identity or an `unauthorized` error.
    pub fn require_identity(&self) -> Result<&User, Error> {
        self.identity
            .as_ref()
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Copy of the identity and loading flag for route guards.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            identity: self.identity.clone(),
            loading: self.loading,
        }
    }

    async fn resolve_initial(&mut self) -> Result<Option<User>, Error> {
        let Some(token) = &self.token else {
            return Ok(None);
        };
        let lookup = self.auth.current_user(token).await;
        match lookup {
            Ok(Some(identity)) => self.resolve_record(&identity.id).await,
            Ok(None) => {
                debug!("session token no longer maps to an identity");
                Ok(None)
            }
            Err(AuthProviderError::InvalidToken) => self.refresh_expired_token().await,
            Err(err) => Err(err.into()),
        }
    }

    async fn refresh_expired_token(&mut self) -> Result<Option<User>, Error> {
        let Some(refresh_token) = self.refresh_token.clone() else {
            debug!("session token expired and no refresh token is held");
            return Ok(None);
        };
        match self.auth.refresh_session(&refresh_token).await {
            Ok(session) => {
                debug!(user_id = %session.identity.id, "access token refreshed");
                self.apply(AuthEvent::TokenRefreshed(session)).await?;
                Ok(self.identity.clone())
            }
            Err(AuthProviderError::InvalidToken) => {
                debug!("refresh token rejected; session is anonymous");
                self.token = None;
                self.refresh_token = None;
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn resolve_token(&self) -> Result<Option<User>, Error> {
        let Some(token) = &self.token else {
            return Ok(None);
        };
        let identity = match self.auth.current_user(token).await {
            Ok(Some(identity)) => identity,
            Ok(None) | Err(AuthProviderError::InvalidToken) => {
                debug!("session token no longer maps to an identity");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };
        self.resolve_record(&identity.id).await
    }

    async fn resolve_record(&self, id: &UserId) -> Result<Option<User>, Error> {
        let record = self.users.find_by_id(id).await?;
        if record.is_none() {
            warn!(user_id = %id, "authenticated identity has no user record");
        }
        Ok(record)
    }
}
