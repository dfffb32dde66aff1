//! Removal strategy chain
//!
//! Strategies run strictly one after another. The chain stops at the first
//! success and otherwise returns every attempt so the failure can be
//! reported as one aggregated diagnostic.

use crate::domain::{
    AccountId, ChainFailure, IdentityRecord, RemovalFailure, StrategyAttempt, StrategyKind,
    StrategyResult,
};
use crate::error::{AppError, Result};
use crate::provider::{EndpointResponse, ProviderClient};
use crate::repository::IdentityStore;
use async_trait::async_trait;
use metrics::counter;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Privileged, user-scoped identity delete endpoint
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PrivilegedIdentityEndpoint: Send + Sync {
    async fn delete_identity(
        &self,
        account_id: &AccountId,
        internal_id: &str,
    ) -> Result<EndpointResponse>;
}

#[async_trait]
impl PrivilegedIdentityEndpoint for ProviderClient {
    async fn delete_identity(
        &self,
        account_id: &AccountId,
        internal_id: &str,
    ) -> Result<EndpointResponse> {
        self.delete_user_identity(account_id, internal_id).await
    }
}

/// One way of removing an identity binding
#[async_trait]
pub trait RemovalStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    async fn remove(&self, account_id: &AccountId, identity: &IdentityRecord) -> StrategyResult;
}

/// Strategy A: the user-scoped endpoint, called with the service credential
pub struct PrivilegedEndpointRemoval {
    endpoint: Arc<dyn PrivilegedIdentityEndpoint>,
}

impl PrivilegedEndpointRemoval {
    pub fn new(endpoint: Arc<dyn PrivilegedIdentityEndpoint>) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl RemovalStrategy for PrivilegedEndpointRemoval {
    fn kind(&self) -> StrategyKind {
        StrategyKind::PrivilegedEndpoint
    }

    async fn remove(&self, account_id: &AccountId, identity: &IdentityRecord) -> StrategyResult {
        match self
            .endpoint
            .delete_identity(account_id, &identity.internal_id)
            .await
        {
            Ok(response) if response.is_success() => StrategyResult::succeeded(),
            // Anything but 2xx, including 404, is a clean failure
            Ok(response) => StrategyResult::Failed(RemovalFailure::Http {
                status: response.status,
                body: response.body,
            }),
            Err(AppError::Timeout(_)) => StrategyResult::Failed(RemovalFailure::Timeout),
            Err(e) => StrategyResult::Failed(RemovalFailure::Transport(e.to_string())),
        }
    }
}

/// Strategy B: delete straight from the provider's identity storage
pub struct StoreMutationRemoval {
    store: Option<Arc<dyn IdentityStore>>,
}

impl StoreMutationRemoval {
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self { store: Some(store) }
    }

    /// Strategy without storage access; always reports `NotApplicable`
    pub fn unavailable() -> Self {
        Self { store: None }
    }
}

#[async_trait]
impl RemovalStrategy for StoreMutationRemoval {
    fn kind(&self) -> StrategyKind {
        StrategyKind::StoreMutation
    }

    async fn remove(&self, account_id: &AccountId, identity: &IdentityRecord) -> StrategyResult {
        let Some(store) = &self.store else {
            return StrategyResult::NotApplicable;
        };

        match store
            .delete_identity(account_id, &identity.internal_id)
            .await
        {
            Ok(0) => StrategyResult::Succeeded {
                already_removed: true,
            },
            Ok(_) => StrategyResult::succeeded(),
            Err(AppError::Database(sqlx::Error::PoolTimedOut)) | Err(AppError::Timeout(_)) => {
                StrategyResult::Failed(RemovalFailure::Timeout)
            }
            Err(e) => StrategyResult::Failed(RemovalFailure::Storage(e.to_string())),
        }
    }
}

/// Result of running the whole chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainResult {
    Succeeded {
        strategy: StrategyKind,
        attempts: Vec<StrategyAttempt>,
    },
    Exhausted(ChainFailure),
}

/// Ordered removal strategies with a per-step time budget
pub struct RemovalChain {
    strategies: Vec<Box<dyn RemovalStrategy>>,
    step_timeout: Duration,
}

impl RemovalChain {
    pub fn new(step_timeout: Duration) -> Self {
        Self {
            strategies: Vec::new(),
            step_timeout,
        }
    }

    /// Append a strategy; strategies run in insertion order
    pub fn with_strategy(mut self, strategy: impl RemovalStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn strategy_kinds(&self) -> Vec<StrategyKind> {
        self.strategies.iter().map(|s| s.kind()).collect()
    }

    pub async fn remove(&self, account_id: &AccountId, identity: &IdentityRecord) -> ChainResult {
        let mut attempts = Vec::with_capacity(self.strategies.len());

        for strategy in &self.strategies {
            let kind = strategy.kind();
            let result =
                match tokio::time::timeout(self.step_timeout, strategy.remove(account_id, identity))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => StrategyResult::Failed(RemovalFailure::Timeout),
                };

            counter!(
                "idlink_unlink_strategy_attempts_total",
                "strategy" => kind.as_str(),
                "result" => result.label()
            )
            .increment(1);

            if result.is_success() {
                info!(
                    strategy = kind.as_str(),
                    internal_id = %identity.internal_id,
                    result = %result,
                    "Removal strategy succeeded"
                );
                attempts.push(StrategyAttempt {
                    strategy: kind,
                    result,
                });
                return ChainResult::Succeeded {
                    strategy: kind,
                    attempts,
                };
            }

            warn!(
                strategy = kind.as_str(),
                internal_id = %identity.internal_id,
                result = %result,
                "Removal strategy did not succeed, trying next"
            );
            attempts.push(StrategyAttempt {
                strategy: kind,
                result,
            });
        }

        ChainResult::Exhausted(ChainFailure { attempts })
    }
}
