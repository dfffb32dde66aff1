//! Unlink outcome model
//!
//! Every unlink call ends in exactly one [`UnlinkOutcome`]. Outcomes carry the
//! per-strategy attempt history so callers can log which mechanism ran and
//! what each one returned.

use super::identity::IdentityRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Removal mechanisms, in chain order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Privileged delete against the user-scoped identity endpoint
    #[serde(rename = "A")]
    PrivilegedEndpoint,
    /// Direct delete in the provider's identity storage
    #[serde(rename = "B")]
    StoreMutation,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::PrivilegedEndpoint => "A",
            StrategyKind::StoreMutation => "B",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a single strategy attempt did not succeed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalFailure {
    /// The endpoint answered with a non-2xx status
    Http { status: u16, body: String },
    /// The request never produced a response
    Transport(String),
    /// The storage mutation returned an error
    Storage(String),
    /// The step exceeded its time budget
    Timeout,
}

impl fmt::Display for RemovalFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemovalFailure::Http { status, body } => write!(f, "HTTP {} - {}", status, body),
            RemovalFailure::Transport(msg) => write!(f, "transport error: {}", msg),
            RemovalFailure::Storage(msg) => write!(f, "storage error: {}", msg),
            RemovalFailure::Timeout => f.write_str("timed out"),
        }
    }
}

/// Result of one removal strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyResult {
    /// `already_removed` is set when the store confirmed nothing was left to delete
    Succeeded { already_removed: bool },
    NotApplicable,
    Failed(RemovalFailure),
}

impl StrategyResult {
    pub fn succeeded() -> Self {
        StrategyResult::Succeeded {
            already_removed: false,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, StrategyResult::Succeeded { .. })
    }

    /// Short label for logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            StrategyResult::Succeeded {
                already_removed: true,
            } => "already_removed",
            StrategyResult::Succeeded { .. } => "succeeded",
            StrategyResult::NotApplicable => "not_applicable",
            StrategyResult::Failed(RemovalFailure::Timeout) => "timeout",
            StrategyResult::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for StrategyResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyResult::Succeeded {
                already_removed: true,
            } => f.write_str("succeeded (already removed)"),
            StrategyResult::Succeeded { .. } => f.write_str("succeeded"),
            StrategyResult::NotApplicable => f.write_str("not applicable"),
            StrategyResult::Failed(cause) => write!(f, "failed: {}", cause),
        }
    }
}

/// One strategy run, as recorded by the chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyAttempt {
    pub strategy: StrategyKind,
    pub result: StrategyResult,
}

/// Aggregated diagnostic of an exhausted removal chain
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChainFailure {
    pub attempts: Vec<StrategyAttempt>,
}

impl ChainFailure {
    /// True when the last strategy that actually ran hit its timeout.
    pub fn timed_out(&self) -> bool {
        self.attempts
            .iter()
            .rev()
            .find(|a| a.result != StrategyResult::NotApplicable)
            .map(|a| a.result == StrategyResult::Failed(RemovalFailure::Timeout))
            .unwrap_or(false)
    }
}

impl fmt::Display for ChainFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.attempts.is_empty() {
            return f.write_str("no removal strategy configured");
        }
        let parts: Vec<String> = self
            .attempts
            .iter()
            .map(|a| format!("{}: {}", a.strategy, a.result))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Client-visible error taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnlinkErrorKind {
    MissingParameter,
    AccountNotFound,
    IdentityNotOwned,
    DirectoryUnavailable,
    RemovalFailed,
    Timeout,
}

impl UnlinkErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnlinkErrorKind::MissingParameter => "MissingParameter",
            UnlinkErrorKind::AccountNotFound => "AccountNotFound",
            UnlinkErrorKind::IdentityNotOwned => "IdentityNotOwned",
            UnlinkErrorKind::DirectoryUnavailable => "DirectoryUnavailable",
            UnlinkErrorKind::RemovalFailed => "RemovalFailed",
            UnlinkErrorKind::Timeout => "Timeout",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    MissingParameter,
    AccountNotFound,
    IdentityNotOwned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    DirectoryUnavailable(String),
    DirectoryTimeout,
    RemovalExhausted(ChainFailure),
    /// The unlink task stopped before producing an outcome
    Aborted(String),
}

/// Terminal state of one unlink call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnlinkOutcome {
    Succeeded {
        identity: IdentityRecord,
        strategy: StrategyKind,
        attempts: Vec<StrategyAttempt>,
    },
    Rejected(RejectReason),
    Failed(FailureCause),
}

impl UnlinkOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UnlinkOutcome::Succeeded { .. })
    }

    pub fn strategy_used(&self) -> Option<StrategyKind> {
        match self {
            UnlinkOutcome::Succeeded { strategy, .. } => Some(*strategy),
            _ => None,
        }
    }

    pub fn error_kind(&self) -> Option<UnlinkErrorKind> {
        match self {
            UnlinkOutcome::Succeeded { .. } => None,
            UnlinkOutcome::Rejected(RejectReason::MissingParameter) => {
                Some(UnlinkErrorKind::MissingParameter)
            }
            UnlinkOutcome::Rejected(RejectReason::AccountNotFound) => {
                Some(UnlinkErrorKind::AccountNotFound)
            }
            UnlinkOutcome::Rejected(RejectReason::IdentityNotOwned) => {
                Some(UnlinkErrorKind::IdentityNotOwned)
            }
            UnlinkOutcome::Failed(FailureCause::DirectoryUnavailable(_)) => {
                Some(UnlinkErrorKind::DirectoryUnavailable)
            }
            UnlinkOutcome::Failed(FailureCause::DirectoryTimeout) => Some(UnlinkErrorKind::Timeout),
            UnlinkOutcome::Failed(FailureCause::RemovalExhausted(chain)) if chain.timed_out() => {
                Some(UnlinkErrorKind::Timeout)
            }
            UnlinkOutcome::Failed(FailureCause::RemovalExhausted(_))
            | UnlinkOutcome::Failed(FailureCause::Aborted(_)) => {
                Some(UnlinkErrorKind::RemovalFailed)
            }
        }
    }

    /// Message safe to show to the end user
    pub fn detail(&self) -> String {
        match self.error_kind() {
            None => "Identity unlinked successfully".to_string(),
            Some(UnlinkErrorKind::MissingParameter) => {
                "An identity reference is required".to_string()
            }
            Some(UnlinkErrorKind::AccountNotFound) => "Account not found".to_string(),
            Some(UnlinkErrorKind::IdentityNotOwned) => {
                "Identity is not linked to this account".to_string()
            }
            Some(UnlinkErrorKind::DirectoryUnavailable) => {
                "Identity directory is unavailable, try again later".to_string()
            }
            Some(UnlinkErrorKind::Timeout) => {
                "The identity service timed out, try again later".to_string()
            }
            Some(UnlinkErrorKind::RemovalFailed) => "Could not unlink identity".to_string(),
        }
    }

    /// Full operator-facing diagnostic, including every strategy attempt
    pub fn diagnostic(&self) -> String {
        match self {
            UnlinkOutcome::Succeeded {
                identity,
                strategy,
                attempts,
            } => format!(
                "removed {} ({}) via strategy {} [{}]",
                identity.internal_id,
                identity.provider,
                strategy,
                ChainFailure {
                    attempts: attempts.clone()
                }
            ),
            UnlinkOutcome::Rejected(reason) => format!("rejected: {:?}", reason),
            UnlinkOutcome::Failed(FailureCause::DirectoryUnavailable(msg)) => {
                format!("directory unavailable: {}", msg)
            }
            UnlinkOutcome::Failed(FailureCause::DirectoryTimeout) => {
                "directory fetch timed out".to_string()
            }
            UnlinkOutcome::Failed(FailureCause::RemovalExhausted(chain)) => {
                format!("all removal strategies failed: {}", chain)
            }
            UnlinkOutcome::Failed(FailureCause::Aborted(msg)) => {
                format!("unlink task aborted: {}", msg)
            }
        }
    }
}

/// Wire shape of an unlink response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlinkResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy_used: Option<StrategyKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<UnlinkErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl From<&UnlinkOutcome> for UnlinkResponse {
    fn from(outcome: &UnlinkOutcome) -> Self {
        match outcome.error_kind() {
            None => Self {
                success: true,
                strategy_used: outcome.strategy_used(),
                error_kind: None,
                detail: None,
            },
            Some(kind) => Self {
                success: false,
                strategy_used: None,
                error_kind: Some(kind),
                detail: Some(outcome.detail()),
            },
        }
    }
}
