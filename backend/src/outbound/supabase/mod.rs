//! Supabase-compatible backend-as-a-service adapters.
//!
//! One shared [`SupabaseClient`] carries the base URL, the service key and a
//! reqwest client with the configured timeout. The adapters own transport
//! details only: URL building, headers, status mapping and row decoding.
//!
//! | Port | Endpoint |
//! | --- | --- |
//! | [`SupabaseAuthProvider`] | `/auth/v1/*` |
//! | [`SupabaseUserRepository`] | `/rest/v1/users` |
//! | [`SupabaseProjectRepository`] | `/rest/v1/projects` |
//! | [`SupabaseObjectStorage`] | `/storage/v1/object/{bucket}/*` |

mod auth;
mod client;
mod dto;
mod projects;
mod storage;
mod users;

pub use auth::SupabaseAuthProvider;
pub use client::{SupabaseClient, SupabaseClientError, SupabaseConfig};
pub use projects::SupabaseProjectRepository;
pub use storage::SupabaseObjectStorage;
pub use users::SupabaseUserRepository;
