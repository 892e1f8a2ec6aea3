//! Server settings loaded via OrthoConfig.
//!
//! Values come from `DESIGNDESK_*` environment variables, configuration files
//! and command-line flags. Session cookie settings are read separately by
//! [`crate::inbound::http::session_config`].

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;
use zeroize::Zeroizing;

use crate::outbound::supabase::SupabaseConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_BUCKET: &str = "projects";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Which adapter family backs the ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Process-local adapters. State is lost on restart.
    Memory,
    /// Supabase auth, PostgREST tables and storage.
    Supabase,
}

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    /// `bind_addr` is not a socket address.
    #[error("invalid bind address {value}: {message}")]
    BindAddr { value: String, message: String },
    /// `backend` names neither adapter family.
    #[error("unknown backend {0}; expected memory or supabase")]
    Backend(String),
    /// A setting the Supabase backend needs is absent.
    #[error("{0} is required for the supabase backend")]
    Missing(&'static str),
    /// `supabase_url` does not parse.
    #[error("invalid supabase url {value}: {message}")]
    SupabaseUrl { value: String, message: String },
    /// `http_timeout_secs` is zero.
    #[error("http timeout must be at least one second")]
    ZeroTimeout,
}

/// Startup configuration for the HTTP server and its adapters.
///
/// Every field is optional; an empty environment yields the in-memory backend
/// listening on `0.0.0.0:8080`.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DESIGNDESK")]
#[serde(default)]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// `memory` or `supabase`.
    pub backend: Option<String>,
    /// Base URL of the Supabase project.
    pub supabase_url: Option<String>,
    /// Service key for the Supabase project.
    pub supabase_key: Option<String>,
    /// Storage bucket for project attachments.
    pub storage_bucket: Option<String>,
    /// Timeout applied to every outbound request, in seconds.
    pub http_timeout_secs: Option<u64>,
}

impl ServerSettings {
    /// Listen address, `0.0.0.0:8080` when unset.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    /// Selected adapter family; memory when unset. Case-insensitive.
    pub fn backend(&self) -> Result<BackendKind, SettingsError> {
        match self
            .backend
            .as_deref()
            .map(str::trim)
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            None | Some("memory") => Ok(BackendKind::Memory),
            Some("supabase") => Ok(BackendKind::Supabase),
            Some(other) => Err(SettingsError::Backend(other.to_owned())),
        }
    }

    /// Attachment bucket, `projects` when unset or blank.
    pub fn storage_bucket(&self) -> &str {
        self.storage_bucket
            .as_deref()
            .map(str::trim)
            .filter(|bucket| !bucket.is_empty())
            .unwrap_or(DEFAULT_BUCKET)
    }

    /// Outbound request timeout, ten seconds when unset.
    pub fn http_timeout(&self) -> Result<Duration, SettingsError> {
        match self.http_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS) {
            0 => Err(SettingsError::ZeroTimeout),
            secs => Ok(Duration::from_secs(secs)),
        }
    }

    /// Connection settings for the Supabase adapters.
    ///
    /// # Errors
    ///
    /// Fails when the URL or key is missing, or the URL does not parse.
    pub fn supabase_config(&self) -> Result<SupabaseConfig, SettingsError> {
        let raw_url = non_blank(self.supabase_url.as_deref())
            .ok_or(SettingsError::Missing("DESIGNDESK_SUPABASE_URL"))?;
        let api_key = non_blank(self.supabase_key.as_deref())
            .ok_or(SettingsError::Missing("DESIGNDESK_SUPABASE_KEY"))?;
        let base_url = Url::parse(raw_url).map_err(|err| SettingsError::SupabaseUrl {
            value: raw_url.to_owned(),
            message: err.to_string(),
        })?;
        Ok(SupabaseConfig {
            base_url,
            api_key: Zeroizing::new(api_key.to_owned()),
            bucket: self.storage_bucket().to_owned(),
            timeout: self.http_timeout()?,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
