//! Direct identity store repository
//!
//! Mutates the provider's identity table directly. Only used as the fallback
//! removal path, after ownership has been verified against the directory.

use crate::domain::AccountId;
use crate::error::Result;
use async_trait::async_trait;
use sqlx::PgPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Delete one identity binding. Returns the number of rows removed;
    /// zero means the binding was already gone.
    async fn delete_identity(&self, account_id: &AccountId, internal_id: &str) -> Result<u64>;

    /// Check the store is reachable
    async fn ping(&self) -> Result<()>;
}

pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn delete_identity(&self, account_id: &AccountId, internal_id: &str) -> Result<u64> {
        // Scoped to the owning account as well as the binding key
        let result = sqlx::query(
            r#"
            DELETE FROM auth.identities
            WHERE id::text = $1 AND user_id::text = $2
            "#,
        )
        .bind(internal_id)
        .bind(account_id.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
