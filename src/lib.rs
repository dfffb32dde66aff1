//! Idlink Core - Linked identity backend
//!
//! This crate provides the backend that removes external login identities
//! (social logins) from community accounts. It verifies ownership against the
//! auth provider's directory and then removes the identity through an ordered
//! chain of removal strategies.

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod provider;
pub mod repository;
pub mod server;
pub mod service;
pub mod state;
pub mod telemetry;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, Result};
