//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::{App, test, web};
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{Registration, Role, User};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::inbound::http::users::login;
use crate::outbound::memory::{
    MemoryAuthProvider, MemoryFileStore, MemoryObjectStorage, MemoryProjectRepository,
    MemoryUserRepository,
};

/// Password used for every account registered through [`TestWorld`].
pub const TEST_PASSWORD: &str = "correct horse battery staple";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    session_middleware_with_key(Key::generate())
}

fn session_middleware_with_key(key: Key) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Clock pinned to a single instant.
pub struct FixtureClock {
    pub utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub fn fixture_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 2, 9, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

/// Memory-backed adapters plus the HTTP state and session key built on them.
pub struct TestWorld {
    pub auth: Arc<MemoryAuthProvider>,
    pub users: Arc<MemoryUserRepository>,
    pub projects: Arc<MemoryProjectRepository>,
    pub storage: Arc<MemoryObjectStorage>,
    pub files: Arc<MemoryFileStore>,
    key: Key,
    state: web::Data<HttpState>,
}

impl TestWorld {
    /// World whose object storage accepts uploads.
    pub fn new() -> Self {
        Self::with_storage(MemoryObjectStorage::default())
    }

    /// World whose storage bucket is missing, so uploads use the fallback
    /// file store.
    pub fn without_bucket() -> Self {
        Self::with_storage(MemoryObjectStorage::without_bucket("projects"))
    }

    fn with_storage(storage: MemoryObjectStorage) -> Self {
        let auth = Arc::new(MemoryAuthProvider::default());
        let users = Arc::new(MemoryUserRepository::default());
        let projects = Arc::new(MemoryProjectRepository::default());
        let storage = Arc::new(storage);
        let files = Arc::new(MemoryFileStore::default());
        let state = HttpState::new(
            HttpStatePorts {
                auth: auth.clone(),
                users: users.clone(),
                projects: projects.clone(),
                storage: storage.clone(),
                files: files.clone(),
            },
            Arc::new(FixtureClock {
                utc_now: fixture_now(),
            }),
        );
        Self {
            auth,
            users,
            projects,
            storage,
            files,
            key: Key::generate(),
            state: web::Data::new(state),
        }
    }

    pub fn state(&self) -> web::Data<HttpState> {
        self.state.clone()
    }

    /// Session middleware sharing this world's key, so cookies issued by one
    /// test app are accepted by another.
    pub fn session_middleware(&self) -> SessionMiddleware<CookieSessionStore> {
        session_middleware_with_key(self.key.clone())
    }

    /// Register an account and its profile.
    pub async fn register(&self, email: &str, role: Role, full_name: &str) -> User {
        let registration =
            Registration::try_from_parts(email, TEST_PASSWORD, role.as_str(), full_name)
                .expect("valid registration");
        self.state
            .accounts()
            .register(&registration)
            .await
            .expect("registration succeeds")
    }

    /// Log in through the HTTP login handler and return the session cookie.
    pub async fn login_cookie(&self, email: &str) -> Cookie<'static> {
        let app = test::init_service(
            App::new()
                .app_data(self.state())
                .wrap(self.session_middleware())
                .service(web::scope("/api/v1").service(login)),
        )
        .await;
        let response = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/login")
                .set_json(serde_json::json!({ "email": email, "password": TEST_PASSWORD }))
                .to_request(),
        )
        .await;
        assert!(response.status().is_success(), "login failed: {}", response.status());
        response
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .map(Cookie::into_owned)
            .expect("session cookie set")
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}
