//! Unlink orchestrator
//!
//! Validating -> FetchingDirectory -> Verifying -> Removing -> terminal.
//! No state is kept between calls and no stage is retried. Every failure is
//! classified into an [`UnlinkOutcome`] before it leaves this module.

use crate::domain::{
    AccountId, FailureCause, IdentityRecord, RejectReason, UnlinkOutcome, UnlinkRequest,
};
use crate::error::{AppError, Result};
use crate::service::directory::IdentityDirectory;
use crate::service::ownership::{self, OwnershipError};
use crate::service::removal::{ChainResult, RemovalChain};
use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn, Instrument};

pub struct UnlinkService<D: IdentityDirectory> {
    directory: Arc<D>,
    chain: RemovalChain,
    step_timeout: Duration,
}

impl<D: IdentityDirectory + 'static> UnlinkService<D> {
    pub fn new(directory: Arc<D>, chain: RemovalChain, step_timeout: Duration) -> Self {
        Self {
            directory,
            chain,
            step_timeout,
        }
    }

    /// Current identities of an account, straight from the directory
    pub async fn list_identities(&self, account_id: &AccountId) -> Result<Vec<IdentityRecord>> {
        tokio::time::timeout(self.step_timeout, self.directory.fetch_identities(account_id))
            .await
            .map_err(|_| AppError::Timeout("Identity directory fetch".to_string()))?
    }

    /// Run one unlink request to a terminal outcome
    pub async fn unlink(&self, request: UnlinkRequest) -> UnlinkOutcome {
        let span = tracing::info_span!("unlink", account_id = %request.account_id);

        async {
            let started = Instant::now();
            let outcome = self.run(&request).await;
            record_outcome(&outcome, started.elapsed());
            outcome
        }
        .instrument(span)
        .await
    }

    /// Run the unlink on its own task.
    ///
    /// If the caller goes away (e.g., the HTTP client disconnects) the
    /// in-flight directory or delete call still completes or times out
    /// instead of being dropped halfway.
    pub async fn unlink_detached(self: Arc<Self>, request: UnlinkRequest) -> UnlinkOutcome {
        match tokio::spawn(async move { self.unlink(request).await }).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Unlink task did not complete: {}", e);
                UnlinkOutcome::Failed(FailureCause::Aborted(e.to_string()))
            }
        }
    }

    async fn run(&self, request: &UnlinkRequest) -> UnlinkOutcome {
        // Validating
        let reference = request.reference.trim();
        if request.account_id.is_blank() || reference.is_empty() {
            return UnlinkOutcome::Rejected(RejectReason::MissingParameter);
        }

        // FetchingDirectory
        let fetched = tokio::time::timeout(
            self.step_timeout,
            self.directory.fetch_identities(&request.account_id),
        )
        .await;
        let identities = match fetched {
            Ok(Ok(identities)) => identities,
            Ok(Err(AppError::NotFound(_))) => {
                return UnlinkOutcome::Rejected(RejectReason::AccountNotFound)
            }
            Ok(Err(AppError::Timeout(_))) | Err(_) => {
                return UnlinkOutcome::Failed(FailureCause::DirectoryTimeout)
            }
            Ok(Err(e)) => {
                return UnlinkOutcome::Failed(FailureCause::DirectoryUnavailable(e.to_string()))
            }
        };
        debug!(count = identities.len(), "Directory fetched");

        // Verifying
        let identity = match ownership::resolve(&identities, reference) {
            Ok(identity) => identity.clone(),
            Err(OwnershipError::NotOwned) => {
                return UnlinkOutcome::Rejected(RejectReason::IdentityNotOwned)
            }
            Err(e @ OwnershipError::Ambiguous(_)) => {
                return UnlinkOutcome::Failed(FailureCause::DirectoryUnavailable(e.to_string()))
            }
        };
        debug!(
            internal_id = %identity.internal_id,
            provider = %identity.provider,
            "Ownership verified"
        );

        // Removing
        match self.chain.remove(&request.account_id, &identity).await {
            ChainResult::Succeeded { strategy, attempts } => UnlinkOutcome::Succeeded {
                identity,
                strategy,
                attempts,
            },
            ChainResult::Exhausted(failure) => {
                UnlinkOutcome::Failed(FailureCause::RemovalExhausted(failure))
            }
        }
    }
}

fn record_outcome(outcome: &UnlinkOutcome, elapsed: Duration) {
    let strategy = outcome.strategy_used().map(|s| s.as_str()).unwrap_or("none");
    let error_kind = outcome.error_kind().map(|k| k.as_str()).unwrap_or("none");
    let label = match outcome {
        UnlinkOutcome::Succeeded { .. } => "succeeded",
        UnlinkOutcome::Rejected(_) => "rejected",
        UnlinkOutcome::Failed(_) => "failed",
    };

    counter!(
        "idlink_unlink_requests_total",
        "outcome" => label,
        "error_kind" => error_kind,
        "strategy" => strategy
    )
    .increment(1);
    histogram!("idlink_unlink_duration_seconds").record(elapsed.as_secs_f64());

    match outcome {
        UnlinkOutcome::Succeeded { .. } => {
            info!(strategy, diagnostic = %outcome.diagnostic(), "Identity unlinked")
        }
        UnlinkOutcome::Rejected(_) => {
            warn!(error_kind, diagnostic = %outcome.diagnostic(), "Unlink rejected")
        }
        UnlinkOutcome::Failed(_) => {
            error!(error_kind, diagnostic = %outcome.diagnostic(), "Unlink failed")
        }
    }
}
