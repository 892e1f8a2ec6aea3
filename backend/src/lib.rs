//! DesignDesk backend library.
//!
//! Hexagonal layout: [`domain`] holds types, services and ports;
//! [`inbound::http`] adapts Actix requests onto the domain; [`outbound`]
//! provides in-memory and Supabase port implementations.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
pub use domain::TraceId;
