//! Auth adapter backed by the GoTrue endpoints under `/auth/v1`.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use tracing::debug;

use super::client::{CallFailure, SupabaseClient, decode_json};
use super::dto::{
    AuthUserDto, PasswordGrantDto, RefreshGrantDto, SignUpMetadataDto, SignUpRequestDto,
    SignUpResponseDto, TokenResponseDto,
};
use crate::domain::ports::{AuthProvider, AuthProviderError};
use crate::domain::{
    AccessToken, AuthIdentity, AuthSession, LoginCredentials, RefreshToken, Registration,
};

/// [`AuthProvider`] talking to the hosted auth service.
#[derive(Clone)]
pub struct SupabaseAuthProvider {
    client: SupabaseClient,
}

impl SupabaseAuthProvider {
    /// Adapter sharing `client` with the other Supabase adapters.
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

fn map_failure(failure: CallFailure) -> AuthProviderError {
    match failure.status() {
        None => AuthProviderError::unavailable(failure.message()),
        Some(status) if status.is_server_error() => AuthProviderError::unavailable(failure.message()),
        Some(_) => AuthProviderError::rejected(failure.message()),
    }
}

/// Phrases and error codes GoTrue uses for a duplicate email.
const DUPLICATE_EMAIL_MARKERS: [&str; 5] = [
    "already registered",
    "already been registered",
    "already exists",
    "user_already_exists",
    "email_exists",
];

fn map_sign_up_failure(failure: CallFailure, email: &str) -> AuthProviderError {
    let is_client_error = failure
        .status()
        .is_some_and(|status| status.is_client_error());
    if is_client_error
        && DUPLICATE_EMAIL_MARKERS
            .iter()
            .any(|marker| failure.mentions(marker))
    {
        return AuthProviderError::email_taken(email);
    }
    map_failure(failure)
}

fn map_sign_in_failure(failure: CallFailure) -> AuthProviderError {
    if failure.mentions("invalid login credentials")
        || matches!(
            failure.status(),
            Some(StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED)
        )
    {
        return AuthProviderError::invalid_credentials();
    }
    map_failure(failure)
}

// GoTrue answers 400 for unknown, reused or revoked refresh tokens.
fn map_refresh_failure(failure: CallFailure) -> AuthProviderError {
    match failure.status() {
        Some(StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
            AuthProviderError::invalid_token()
        }
        _ => map_failure(failure),
    }
}

fn map_token_failure(failure: CallFailure) -> AuthProviderError {
    match failure.status() {
        Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
            AuthProviderError::invalid_token()
        }
        _ => map_failure(failure),
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuthProvider {
    async fn sign_up(&self, registration: &Registration) -> Result<AuthIdentity, AuthProviderError> {
        let credentials = registration.credentials();
        let email = credentials.email().as_ref();
        let body = SignUpRequestDto {
            email,
            password: credentials.password(),
            data: SignUpMetadataDto {
                full_name: registration.full_name().map(AsRef::as_ref),
                role: registration.role().as_str(),
            },
        };
        let url = self.client.endpoint("auth/v1/signup").map_err(map_failure)?;
        let bytes = self
            .client
            .send(self.client.request(Method::POST, url).json(&body))
            .await
            .map_err(|failure| map_sign_up_failure(failure, email))?;

        let response: SignUpResponseDto =
            decode_json(&bytes).map_err(AuthProviderError::rejected)?;
        let identity = response
            .into_user()
            .into_identity()
            .map_err(AuthProviderError::rejected)?;
        debug!(user_id = %identity.id, "registered auth account");
        Ok(identity)
    }

    async fn sign_in(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthSession, AuthProviderError> {
        let body = PasswordGrantDto {
            email: credentials.email().as_ref(),
            password: credentials.password(),
        };
        let mut url = self.client.endpoint("auth/v1/token").map_err(map_failure)?;
        url.query_pairs_mut().append_pair("grant_type", "password");
        let bytes = self
            .client
            .send(self.client.request(Method::POST, url).json(&body))
            .await
            .map_err(map_sign_in_failure)?;

        let response: TokenResponseDto =
            decode_json(&bytes).map_err(AuthProviderError::rejected)?;
        response.into_session().map_err(AuthProviderError::rejected)
    }

    async fn refresh_session(
        &self,
        refresh_token: &RefreshToken,
    ) -> Result<AuthSession, AuthProviderError> {
        let body = RefreshGrantDto {
            refresh_token: refresh_token.expose(),
        };
        let mut url = self.client.endpoint("auth/v1/token").map_err(map_failure)?;
        url.query_pairs_mut().append_pair("grant_type", "refresh_token");
        let bytes = self
            .client
            .send(self.client.request(Method::POST, url).json(&body))
            .await
            .map_err(map_refresh_failure)?;

        let response: TokenResponseDto =
            decode_json(&bytes).map_err(AuthProviderError::rejected)?;
        let session = response.into_session().map_err(AuthProviderError::rejected)?;
        debug!(user_id = %session.identity.id, "refreshed auth session");
        Ok(session)
    }

    async fn sign_out(&self, token: &AccessToken) -> Result<(), AuthProviderError> {
        let url = self.client.endpoint("auth/v1/logout").map_err(map_failure)?;
        match self
            .client
            .send(
                self.client
                    .request(Method::POST, url)
                    .bearer_auth(token.expose()),
            )
            .await
        {
            Ok(_) => Ok(()),
            // An expired token is already signed out.
            Err(failure) => match map_token_failure(failure) {
                AuthProviderError::InvalidToken => Ok(()),
                other => Err(other),
            },
        }
    }

    async fn current_user(
        &self,
        token: &AccessToken,
    ) -> Result<Option<AuthIdentity>, AuthProviderError> {
        let url = self.client.endpoint("auth/v1/user").map_err(map_failure)?;
        let bytes = self
            .client
            .send(
                self.client
                    .request(Method::GET, url)
                    .bearer_auth(token.expose()),
            )
            .await
            .map_err(map_token_failure)?;

        let user: AuthUserDto = decode_json(&bytes).map_err(AuthProviderError::rejected)?;
        user.into_identity()
            .map(Some)
            .map_err(AuthProviderError::rejected)
    }
}
