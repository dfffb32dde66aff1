//! Auth provider admin API client
//!
//! Talks to the managed auth provider's REST API using the service-level
//! credential. Two calls matter here: reading a user's bound identities and
//! deleting one identity through the user-scoped identity endpoint.

use crate::config::ProviderConfig;
use crate::domain::AccountId;
use crate::error::{AppError, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use std::time::Duration;

use super::types::*;

/// Header telling the provider which account a privileged call acts for
pub const ON_BEHALF_OF_HEADER: &str = "x-idlink-on-behalf-of";

/// Auth provider admin API client
#[derive(Clone)]
pub struct ProviderClient {
    config: ProviderConfig,
    http_client: Client,
}

impl ProviderClient {
    /// Create a new provider client.
    ///
    /// `request_timeout` bounds every call end to end; running out of it is
    /// reported as [`AppError::Timeout`].
    pub fn new(config: ProviderConfig, request_timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Attach the service credential. The provider expects it both as the
    /// API key and as the bearer token.
    fn with_service_auth(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.service_key)
            .bearer_auth(&self.config.service_key)
    }

    // ============================================================================
    // Directory
    // ============================================================================

    /// Get a user together with its bound identities
    pub async fn get_user(&self, account_id: &AccountId) -> Result<ProviderUser> {
        let url = format!(
            "{}/admin/users/{}",
            self.config.url,
            urlencoding::encode(account_id.as_str())
        );

        let response = self
            .with_service_auth(self.http_client.get(&url))
            .send()
            .await
            .map_err(|e| request_error("Failed to get user", e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound("Account not found".to_string()));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ProviderUnavailable(format!(
                "Failed to get user: {} - {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| request_error("Failed to parse user", e))
    }

    // ============================================================================
    // Identity Management
    // ============================================================================

    /// Delete an identity through the user-scoped identity endpoint,
    /// authenticated with the service credential instead of the user's session.
    ///
    /// Any HTTP answer is returned as-is so the caller can decide what a
    /// non-2xx status means. Only transport failures are errors.
    pub async fn delete_user_identity(
        &self,
        account_id: &AccountId,
        internal_id: &str,
    ) -> Result<EndpointResponse> {
        let url = format!(
            "{}/user/identities/{}",
            self.config.url,
            urlencoding::encode(internal_id)
        );

        let response = self
            .with_service_auth(self.http_client.delete(&url))
            .header(ON_BEHALF_OF_HEADER, account_id.as_str())
            .send()
            .await
            .map_err(|e| request_error("Failed to delete identity", e))?;

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        Ok(EndpointResponse { status, body })
    }
}

fn request_error(context: &str, e: reqwest::Error) -> AppError {
    if e.is_timeout() {
        AppError::Timeout(format!("{}: {}", context, e))
    } else {
        AppError::ProviderUnavailable(format!("{}: {}", context, e))
    }
}
