//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use designdesk::inbound::http::session_config::SessionSettings;
use designdesk::outbound::supabase::SupabaseConfig;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) bucket: String,
    pub(crate) supabase: Option<SupabaseConfig>,
}

impl ServerConfig {
    /// Configuration backed by the in-memory adapters.
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr) -> Self {
        Self {
            session,
            bind_addr,
            bucket: "projects".to_owned(),
            supabase: None,
        }
    }

    /// Name the attachment bucket used by the in-memory storage adapter.
    #[must_use]
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    /// Back every port with the Supabase adapters.
    ///
    /// The fallback file store stays process-local either way.
    #[must_use]
    pub fn with_supabase(mut self, config: SupabaseConfig) -> Self {
        self.supabase = Some(config);
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
