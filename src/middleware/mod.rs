//! HTTP middleware for Idlink Core
//!
//! - Session authentication (`AuthUser` extractor)
//! - Request id propagation and HTTP metrics

pub mod auth;
pub mod observability;

pub use auth::{AuthError, AuthUser};
pub use observability::ObservabilityLayer;
