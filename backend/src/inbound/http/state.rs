//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O. Per-request
//! objects (session gate, workspace) are built from it on demand.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    AuthProvider, FileStore, ObjectStorage, ProjectRepository, UserRepository,
};
use crate::domain::{AccessToken, AccountService, AttachmentService, ProjectWorkspace, SessionGate, User};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub auth: Arc<dyn AuthProvider>,
    pub users: Arc<dyn UserRepository>,
    pub projects: Arc<dyn ProjectRepository>,
    pub storage: Arc<dyn ObjectStorage>,
    pub files: Arc<dyn FileStore>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub auth: Arc<dyn AuthProvider>,
    pub users: Arc<dyn UserRepository>,
    pub projects: Arc<dyn ProjectRepository>,
    pub clock: Arc<dyn Clock>,
    accounts: AccountService,
    attachments: AttachmentService,
}

impl HttpState {
    /// Construct state from a ports bundle and a clock.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use designdesk::inbound::http::state::{HttpState, HttpStatePorts};
    /// use designdesk::outbound::memory::{
    ///     MemoryAuthProvider, MemoryFileStore, MemoryObjectStorage, MemoryProjectRepository,
    ///     MemoryUserRepository,
    /// };
    /// use mockable::DefaultClock;
    ///
    /// let state = HttpState::new(
    ///     HttpStatePorts {
    ///         auth: Arc::new(MemoryAuthProvider::default()),
    ///         users: Arc::new(MemoryUserRepository::default()),
    ///         projects: Arc::new(MemoryProjectRepository::default()),
    ///         storage: Arc::new(MemoryObjectStorage::default()),
    ///         files: Arc::new(MemoryFileStore::default()),
    ///     },
    ///     Arc::new(DefaultClock),
    /// );
    /// let _gate = state.session_gate(None);
    /// ```
    pub fn new(ports: HttpStatePorts, clock: Arc<dyn Clock>) -> Self {
        let HttpStatePorts {
            auth,
            users,
            projects,
            storage,
            files,
        } = ports;
        Self {
            accounts: AccountService::new(auth.clone(), users.clone()),
            attachments: AttachmentService::new(storage, files),
            auth,
            users,
            projects,
            clock,
        }
    }

    /// Unresolved gate for the token carried by a request.
    pub fn session_gate(&self, token: Option<AccessToken>) -> SessionGate {
        SessionGate::new(self.auth.clone(), self.users.clone(), token)
    }

    /// Workspace bound to `identity`.
    pub fn workspace(&self, identity: Option<User>) -> ProjectWorkspace {
        ProjectWorkspace::new(
            identity,
            self.projects.clone(),
            self.users.clone(),
            self.clock.clone(),
        )
    }

    /// Registration, login and roster use-cases.
    pub fn accounts(&self) -> &AccountService {
        &self.accounts
    }

    /// Upload service with the fallback store.
    pub fn attachments(&self) -> &AttachmentService {
        &self.attachments
    }
}
