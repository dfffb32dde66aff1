//! Ownership verification
//!
//! Decides whether a caller-supplied reference names one of the identities
//! in a freshly fetched identity set.

use crate::domain::IdentityRecord;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OwnershipError {
    #[error("identity is not linked to this account")]
    NotOwned,

    #[error("directory returned {0} identities matching the same reference")]
    Ambiguous(usize),
}

/// Resolve `reference` against the account's identity set.
///
/// A record matches when the reference equals its internal id or its
/// external id. More than one matching record means the directory data is
/// inconsistent, and nothing is resolved.
pub fn resolve<'a>(
    identities: &'a [IdentityRecord],
    reference: &str,
) -> Result<&'a IdentityRecord, OwnershipError> {
    let mut matches = identities.iter().filter(|identity| identity.matches(reference));

    let first = matches.next().ok_or(OwnershipError::NotOwned)?;
    let extra = matches.count();
    if extra > 0 {
        return Err(OwnershipError::Ambiguous(extra + 1));
    }

    Ok(first)
}
