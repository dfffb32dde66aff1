//! API integration tests infrastructure
//!
//! Test doubles shared by the HTTP handler tests.


use async_trait::async_trait;
use idlink_core::config::JwtConfig;
use idlink_core::domain::AccountId;
use idlink_core::error::{AppError, Result};
use idlink_core::jwt::JwtManager;
use idlink_core::repository::IdentityStore;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

// ============================================================================
// Test Configuration
// ============================================================================

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test-secret-key-for-api-testing-purposes".to_string(),
        audience: "authenticated".to_string(),
    }
}

pub fn create_test_jwt_manager() -> JwtManager {
    JwtManager::new(test_jwt_config())
}

/// Create a session token for the given account
pub fn create_test_session_token(account_id: &str) -> String {
    create_test_jwt_manager()
        .create_session_token(account_id, Some("member@example.com"), 3600)
        .expect("Failed to create test session token")
}

// ============================================================================
// Test Identity Store
// ============================================================================

/// In-memory identity store recording every delete it receives
#[derive(Default)]
pub struct TestIdentityStore {
    bindings: RwLock<HashSet<(String, String)>>,
    deletes: RwLock<Vec<(String, String)>>,
    failure: RwLock<Option<String>>,
    unreachable: AtomicBool,
}

impl TestIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_binding(&self, account_id: &str, internal_id: &str) {
        self.bindings
            .write()
            .await
            .insert((account_id.to_string(), internal_id.to_string()));
    }

    pub async fn has_binding(&self, account_id: &str, internal_id: &str) -> bool {
        self.bindings
            .read()
            .await
            .contains(&(account_id.to_string(), internal_id.to_string()))
    }

    /// Make every delete fail with a storage error
    pub async fn fail_deletes(&self, message: &str) {
        *self.failure.write().await = Some(message.to_string());
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    pub async fn delete_calls(&self) -> Vec<(String, String)> {
        self.deletes.read().await.clone()
    }
}

#[async_trait]
impl IdentityStore for TestIdentityStore {
    async fn delete_identity(&self, account_id: &AccountId, internal_id: &str) -> Result<u64> {
        let key = (account_id.to_string(), internal_id.to_string());
        self.deletes.write().await.push(key.clone());

        if let Some(message) = self.failure.read().await.clone() {
            return Err(AppError::Database(sqlx::Error::Protocol(message)));
        }

        let removed = self.bindings.write().await.remove(&key);
        Ok(u64::from(removed))
    }

    async fn ping(&self) -> Result<()> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}
