//! Linked identity API handlers

use crate::api::SuccessResponse;
use crate::domain::{IdentityRecord, UnlinkErrorKind, UnlinkOutcome, UnlinkRequest, UnlinkResponse};
use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::state::HasIdentityServices;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

/// Body of an unlink request
#[derive(Debug, Default, Deserialize)]
pub struct UnlinkIdentityInput {
    /// Internal or external id of the identity to remove
    #[serde(default, alias = "identityId")]
    pub reference: Option<String>,
}

impl UnlinkIdentityInput {
    /// Lenient parse: an empty or malformed body reads as a missing reference
    pub fn from_body(body: &[u8]) -> Self {
        if body.is_empty() {
            return Self::default();
        }
        serde_json::from_slice(body).unwrap_or_else(|e| {
            tracing::debug!("Unreadable unlink body: {}", e);
            Self::default()
        })
    }
}

/// List the caller's currently linked identities
pub async fn list_identities<S: HasIdentityServices>(
    State(state): State<S>,
    auth: AuthUser,
) -> Result<Json<SuccessResponse<Vec<IdentityRecord>>>, AppError> {
    let identities = state
        .unlink_service()
        .list_identities(&auth.account_id)
        .await?;

    Ok(Json(SuccessResponse::new(identities)))
}

/// Unlink one identity from the caller's account
pub async fn unlink_identity<S: HasIdentityServices>(
    State(state): State<S>,
    auth: AuthUser,
    body: Bytes,
) -> Response {
    let input = UnlinkIdentityInput::from_body(&body);
    let request = UnlinkRequest::new(auth.account_id, input.reference.unwrap_or_default());

    let outcome = state.unlink_service().clone().unlink_detached(request).await;

    (outcome_status(&outcome), Json(UnlinkResponse::from(&outcome))).into_response()
}

pub fn outcome_status(outcome: &UnlinkOutcome) -> StatusCode {
    match outcome.error_kind() {
        None => StatusCode::OK,
        Some(UnlinkErrorKind::MissingParameter) => StatusCode::BAD_REQUEST,
        Some(UnlinkErrorKind::AccountNotFound) => StatusCode::NOT_FOUND,
        Some(UnlinkErrorKind::IdentityNotOwned) => StatusCode::FORBIDDEN,
        Some(UnlinkErrorKind::DirectoryUnavailable) => StatusCode::SERVICE_UNAVAILABLE,
        Some(UnlinkErrorKind::RemovalFailed) => StatusCode::BAD_GATEWAY,
        Some(UnlinkErrorKind::Timeout) => StatusCode::GATEWAY_TIMEOUT,
    }
}
