//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **memory**: process-local adapters for development, demos and tests
//! - **supabase**: the hosted auth, table and storage APIs over HTTPS
//!
//! Adapters are thin translators between domain types and the wire. They
//! contain no business logic; role checks happen in the domain services.

pub mod memory;
pub mod supabase;
