//! In-memory adapters for every domain port.
//!
//! Used by the development server when no backend-as-a-service is configured
//! and by the HTTP tests. State lives behind `std::sync` locks and is lost on
//! restart; a poisoned lock is reported as an adapter error.

mod auth;
mod files;
mod projects;
mod storage;
mod users;

pub use auth::MemoryAuthProvider;
pub use files::MemoryFileStore;
pub use projects::MemoryProjectRepository;
pub use storage::MemoryObjectStorage;
pub use users::MemoryUserRepository;

fn poisoned(what: &str) -> String {
    format!("{what} lock poisoned")
}
