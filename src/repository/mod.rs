//! Data access layer

pub mod identity_store;

pub use identity_store::{IdentityStore, PgIdentityStore};
