//! Per-request session gate extractor.
//!
//! Each request gets its own [`SessionGate`], built from the tokens in the
//! session cookie and initialised before the handler runs. Nothing about the
//! identity is cached between requests. After resolution the cookie is
//! reconciled with the gate: refreshed tokens are written back, and a cookie
//! whose recorded user id disagrees with the resolved identity is purged.

use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::{debug, warn};

use crate::domain::{AuthEvent, Error, SessionGate, User};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Resolved session for the current request.
pub struct RequestSession {
    /// Gate resolved from the cookie's tokens.
    pub gate: SessionGate,
    /// Cookie session the gate was built from.
    pub cookie: SessionContext,
}

impl RequestSession {
    /// Current identity or `401 Unauthorized`.
    pub fn require_identity(&self) -> Result<&User, Error> {
        self.gate.require_identity()
    }
}

fn state_from_request(req: &HttpRequest) -> Result<web::Data<HttpState>, Error> {
    req.app_data::<web::Data<HttpState>>()
        .cloned()
        .ok_or_else(|| Error::internal("HTTP state is not configured"))
}

/// Bring the cookie in line with what the gate resolved.
async fn reconcile(
    gate: &mut SessionGate,
    cookie: &SessionContext,
    had_token: bool,
) -> Result<(), Error> {
    if let Some(user) = gate.identity() {
        let stored = cookie.user_id()?;
        if stored.as_ref() != Some(user.id()) {
            warn!(user_id = %user.id(), "session cookie belongs to another user; signing out");
            gate.apply(AuthEvent::SignedOut).await?;
            cookie.purge();
            return Ok(());
        }
    }
    match gate.access_token() {
        Some(token) if gate.tokens_rotated() => {
            debug!("storing refreshed session tokens");
            cookie.store_tokens(token, gate.refresh_token())?;
        }
        None if had_token => {
            debug!("session tokens were revoked; purging cookie");
            cookie.purge();
        }
        _ => {}
    }
    Ok(())
}

impl FromRequest for RequestSession {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let cookie = SessionContext::from_request(req, payload);
        let state = state_from_request(req);
        Box::pin(async move {
            let cookie = cookie.await?;
            let state = state?;
            let token = cookie.access_token()?;
            let had_token = token.is_some();
            let mut gate = state
                .session_gate(token)
                .with_refresh_token(cookie.refresh_token()?);
            if let Err(err) = gate.initialise().await {
                // The gate is already unauthenticated; anonymous handling
                // decides whether that is an error for this route.
                warn!(error = %err, "identity resolution failed");
            }
            reconcile(&mut gate, &cookie, had_token).await?;
            Ok(Self { gate, cookie })
        })
    }
}
