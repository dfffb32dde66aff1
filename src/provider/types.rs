//! Auth provider admin API type definitions

use crate::domain::IdentityRecord;
use serde::{Deserialize, Serialize};

/// User representation returned by `GET /admin/users/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderUser {
    pub id: String,
    /// `null` and a missing field both mean "no identities"
    #[serde(default)]
    pub identities: Option<Vec<ProviderIdentity>>,
}

/// Identity binding as stored by the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderIdentity {
    /// Provider-internal key of the binding
    pub identity_id: String,
    /// Subject at the external identity source
    pub id: String,
    pub provider: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl From<ProviderIdentity> for IdentityRecord {
    fn from(identity: ProviderIdentity) -> Self {
        IdentityRecord {
            internal_id: identity.identity_id,
            external_id: identity.id,
            provider: identity.provider,
        }
    }
}

/// Raw answer of a privileged endpoint call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointResponse {
    pub status: u16,
    pub body: String,
}

impl EndpointResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
