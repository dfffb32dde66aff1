//! Application state traits for dependency injection
//!
//! Handlers are generic over [`HasIdentityServices`] so the same code runs
//! against the production `AppState` and the in-memory test state.

use crate::jwt::JwtManager;
use crate::service::{IdentityDirectory, UnlinkService};
use std::future::Future;
use std::sync::Arc;

pub trait HasIdentityServices: Clone + Send + Sync + 'static {
    /// The identity directory backing the unlink service
    type Directory: IdentityDirectory + 'static;

    /// Get the unlink orchestrator
    fn unlink_service(&self) -> &Arc<UnlinkService<Self::Directory>>;

    /// Get the session token manager
    fn jwt_manager(&self) -> &JwtManager;

    /// Check the direct identity store is reachable
    fn check_ready(&self) -> impl Future<Output = bool> + Send;
}
