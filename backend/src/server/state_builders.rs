//! Builders for the HTTP state and its port adapters.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::info;

use designdesk::inbound::http::state::{HttpState, HttpStatePorts};
use designdesk::outbound::memory::{
    MemoryAuthProvider, MemoryFileStore, MemoryObjectStorage, MemoryProjectRepository,
    MemoryUserRepository,
};
use designdesk::outbound::supabase::{
    SupabaseAuthProvider, SupabaseClient, SupabaseConfig, SupabaseObjectStorage,
    SupabaseProjectRepository, SupabaseUserRepository,
};

use super::ServerConfig;

/// Process-local adapters. The bucket is absent so every upload lands in the
/// fallback store and stays reachable under `/api/files`.
fn memory_ports(bucket: &str) -> HttpStatePorts {
    HttpStatePorts {
        auth: Arc::new(MemoryAuthProvider::default()),
        users: Arc::new(MemoryUserRepository::default()),
        projects: Arc::new(MemoryProjectRepository::default()),
        storage: Arc::new(MemoryObjectStorage::without_bucket(bucket)),
        files: Arc::new(MemoryFileStore::default()),
    }
}

fn supabase_ports(config: SupabaseConfig) -> std::io::Result<HttpStatePorts> {
    let client = SupabaseClient::new(config)
        .map_err(|err| std::io::Error::other(format!("supabase client: {err}")))?;
    Ok(HttpStatePorts {
        auth: Arc::new(SupabaseAuthProvider::new(client.clone())),
        users: Arc::new(SupabaseUserRepository::new(client.clone())),
        projects: Arc::new(SupabaseProjectRepository::new(client.clone())),
        storage: Arc::new(SupabaseObjectStorage::new(client)),
        files: Arc::new(MemoryFileStore::default()),
    })
}

/// Build the shared HTTP state for the configured backend.
///
/// # Errors
///
/// Returns [`std::io::Error`] when the Supabase client cannot be built.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let ports = match &config.supabase {
        Some(supabase) => {
            info!(base_url = %supabase.base_url, bucket = %supabase.bucket, "using supabase adapters");
            supabase_ports(supabase.clone())?
        }
        None => {
            info!(bucket = %config.bucket, "using in-memory adapters");
            memory_ports(&config.bucket)
        }
    };
    Ok(web::Data::new(HttpState::new(ports, Arc::new(DefaultClock))))
}
