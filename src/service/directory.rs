//! Identity directory
//!
//! Read-only view of which identities are bound to an account. The provider
//! is the only source of truth; nothing here is cached between calls.

use crate::domain::{AccountId, IdentityRecord};
use crate::error::{AppError, Result};
use crate::provider::ProviderClient;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Fetch the complete, current identity set of an account.
    ///
    /// Fails with `AppError::NotFound` when the account does not exist and
    /// with `AppError::ProviderUnavailable` when the directory cannot be
    /// reached or answers with something malformed.
    async fn fetch_identities(&self, account_id: &AccountId) -> Result<Vec<IdentityRecord>>;
}

#[async_trait]
impl IdentityDirectory for ProviderClient {
    async fn fetch_identities(&self, account_id: &AccountId) -> Result<Vec<IdentityRecord>> {
        let user = self.get_user(account_id).await?;

        if user.id != account_id.as_str() {
            return Err(AppError::ProviderUnavailable(format!(
                "Directory answered for account {} instead of {}",
                user.id, account_id
            )));
        }

        let identities = user.identities.unwrap_or_default();

        if let Some(foreign) = identities.iter().find(|identity| {
            identity
                .user_id
                .as_deref()
                .is_some_and(|owner| owner != account_id.as_str())
        }) {
            return Err(AppError::ProviderUnavailable(format!(
                "Directory listed identity {} owned by another account",
                foreign.identity_id
            )));
        }

        tracing::debug!(
            account_id = %account_id,
            count = identities.len(),
            "Fetched identities from directory"
        );

        Ok(identities.into_iter().map(Into::into).collect())
    }
}
