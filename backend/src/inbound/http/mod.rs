//! HTTP inbound adapter exposing REST endpoints and guarded page views.

pub mod error;
pub mod files;
pub mod health;
pub mod identity;
pub mod pages;
pub mod projects;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod translations;
pub mod users;
pub mod validation;

pub use error::ApiResult;
