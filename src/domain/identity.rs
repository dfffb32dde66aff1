//! Linked identity domain models

use serde::{Deserialize, Serialize};
use std::fmt;

/// Subject of an authenticated session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// One external credential bound to an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRecord {
    /// Provider-assigned key of the binding, used for deletion
    pub internal_id: String,
    /// Identifier as presented by clients (e.g., the social login's subject)
    pub external_id: String,
    /// Identity source such as "discord" or "google"
    pub provider: String,
}

impl IdentityRecord {
    pub fn new(
        internal_id: impl Into<String>,
        external_id: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            internal_id: internal_id.into(),
            external_id: external_id.into(),
            provider: provider.into(),
        }
    }

    /// A reference matches when it equals either identifier exactly.
    pub fn matches(&self, reference: &str) -> bool {
        !reference.is_empty() && (self.internal_id == reference || self.external_id == reference)
    }
}

/// Per-call unlink input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlinkRequest {
    pub account_id: AccountId,
    /// Either the internal or the external id of the target identity
    pub reference: String,
}

impl UnlinkRequest {
    pub fn new(account_id: AccountId, reference: impl Into<String>) -> Self {
        Self {
            account_id,
            reference: reference.into(),
        }
    }
}
