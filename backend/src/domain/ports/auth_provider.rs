//! Driven port for the external authentication service.
//!
//! Adapters talk to the backend-as-a-service auth API; the domain only sees
//! identities, sessions and tokens.

use async_trait::async_trait;

use crate::domain::{
    AccessToken, AuthIdentity, AuthSession, LoginCredentials, RefreshToken, Registration,
};

use super::define_port_error;

define_port_error! {
    /// Failures reported by auth adapters.
    pub enum AuthProviderError {
        /// Email and password did not match an account.
        InvalidCredentials => Unauthorized, "invalid email or password",
        /// The access or refresh token is expired, revoked or unknown.
        InvalidToken => Unauthorized, "session token is no longer valid",
        /// An account already exists for the email.
        EmailTaken { email: String } => Conflict, "an account already exists for {email}",
        /// The service refused the request for another reason.
        Rejected { message: String } => InvalidRequest, "auth service rejected the request: {message}",
        /// The service could not be reached or answered with a server error.
        Unavailable { message: String } => ServiceUnavailable, "auth service unavailable: {message}",
    }
}

/// Account and session operations of the hosted auth service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Create an account, passing role and full name as user metadata.
    async fn sign_up(&self, registration: &Registration) -> Result<AuthIdentity, AuthProviderError>;

    /// Exchange email and password for a session.
    async fn sign_in(&self, credentials: &LoginCredentials)
    -> Result<AuthSession, AuthProviderError>;

    /// Exchange a refresh token for a new session. Refresh tokens are single
    /// use; the returned session carries the next one.
    async fn refresh_session(
        &self,
        refresh_token: &RefreshToken,
    ) -> Result<AuthSession, AuthProviderError>;

    /// Revoke the session behind `token`.
    async fn sign_out(&self, token: &AccessToken) -> Result<(), AuthProviderError>;

    /// Identity behind `token`, or `None` when the token no longer maps to a
    /// live session.
    async fn current_user(
        &self,
        token: &AccessToken,
    ) -> Result<Option<AuthIdentity>, AuthProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Error, ErrorCode};
    use rstest::rstest;

    #[rstest]
    #[case(AuthProviderError::invalid_credentials(), ErrorCode::Unauthorized)]
    #[case(AuthProviderError::invalid_token(), ErrorCode::Unauthorized)]
    #[case(AuthProviderError::email_taken("ana@studio.io"), ErrorCode::Conflict)]
    #[case(AuthProviderError::unavailable("timeout"), ErrorCode::ServiceUnavailable)]
    fn maps_to_domain_codes(#[case] error: AuthProviderError, #[case] expected: ErrorCode) {
        assert_eq!(Error::from(error).code(), expected);
    }
}
