//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Provides a thin wrapper around Actix sessions so handlers only deal with
//! domain-friendly operations: persisting a login, reading the tokens and
//! user id back, storing rotated tokens and purging the cookie on logout.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{AccessToken, Error, RefreshToken, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const ACCESS_TOKEN_KEY: &str = "access_token";
pub(crate) const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the user id and tokens of a fresh login.
    ///
    /// The session id is renewed so a cookie captured before login cannot be
    /// replayed afterwards.
    pub fn persist_login(
        &self,
        user_id: &UserId,
        token: &AccessToken,
        refresh_token: Option<&RefreshToken>,
    ) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user_id.as_ref())
            .map_err(write_failure)?;
        self.store_tokens(token, refresh_token)
    }

    /// Replace the stored tokens after a refresh. The user id is unchanged.
    pub fn store_tokens(
        &self,
        token: &AccessToken,
        refresh_token: Option<&RefreshToken>,
    ) -> Result<(), Error> {
        self.0
            .insert(ACCESS_TOKEN_KEY, token.expose())
            .map_err(write_failure)?;
        match refresh_token {
            Some(refresh) => self
                .0
                .insert(REFRESH_TOKEN_KEY, refresh.expose())
                .map_err(write_failure),
            None => {
                self.0.remove(REFRESH_TOKEN_KEY);
                Ok(())
            }
        }
    }

    /// Fetch the access token from the session, if present.
    pub fn access_token(&self) -> Result<Option<AccessToken>, Error> {
        Ok(self.read_token(ACCESS_TOKEN_KEY)?.map(AccessToken::new))
    }

    /// Fetch the refresh token from the session, if present.
    pub fn refresh_token(&self) -> Result<Option<RefreshToken>, Error> {
        Ok(self.read_token(REFRESH_TOKEN_KEY)?.map(RefreshToken::new))
    }

    /// Fetch the user id recorded at login, if present and well formed.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let id = self.0.get::<String>(USER_ID_KEY).map_err(read_failure)?;
        match id {
            Some(raw) => match UserId::new(raw) {
                Ok(id) => Ok(Some(id)),
                Err(error) => {
                    warn!("invalid user id in session cookie: {error}");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Drop every session value and expire the cookie.
    pub fn purge(&self) {
        self.0.purge();
    }

    fn read_token(&self, key: &str) -> Result<Option<String>, Error> {
        let token = self.0.get::<String>(key).map_err(read_failure)?;
        Ok(token.filter(|raw| !raw.trim().is_empty()))
    }
}

fn read_failure(error: impl std::fmt::Display) -> Error {
    Error::internal(format!("failed to read session: {error}"))
}

fn write_failure(error: impl std::fmt::Display) -> Error {
    Error::internal(format!("failed to persist session: {error}"))
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
