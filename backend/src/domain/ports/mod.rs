//! Domain ports for the hexagonal boundary.
//!
//! Driven ports describe the backend-as-a-service collaborators (auth, data
//! tables, object storage) and the local fallback file store.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_provider;
mod file_store;
mod object_storage;
mod project_repository;
mod user_repository;

#[cfg(test)]
pub use auth_provider::MockAuthProvider;
pub use auth_provider::{AuthProvider, AuthProviderError};
#[cfg(test)]
pub use file_store::MockFileStore;
pub use file_store::{FileStore, FileStoreError};
#[cfg(test)]
pub use object_storage::MockObjectStorage;
pub use object_storage::{ObjectStorage, ObjectStorageError};
#[cfg(test)]
pub use project_repository::MockProjectRepository;
pub use project_repository::{ProjectRepository, ProjectRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
