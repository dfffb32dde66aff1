//! Domain models for Idlink Core

pub mod identity;
pub mod unlink;

pub use identity::{AccountId, IdentityRecord, UnlinkRequest};
pub use unlink::{
    ChainFailure, FailureCause, RejectReason, RemovalFailure, StrategyAttempt, StrategyKind,
    StrategyResult, UnlinkErrorKind, UnlinkOutcome, UnlinkResponse,
};
