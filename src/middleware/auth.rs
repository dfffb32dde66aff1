//! Session authentication
//!
//! `AuthUser` extractor for handlers that act on the caller's own account.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use crate::domain::AccountId;
use crate::state::HasIdentityServices;

/// Authenticated caller, taken from the session token's `sub` claim
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub account_id: AccountId,
}

/// Authentication errors
#[derive(Debug, Clone)]
pub enum AuthError {
    /// No Authorization header present
    MissingToken,
    /// Invalid Authorization header format
    InvalidHeader(String),
    /// Token validation failed
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match &self {
            AuthError::MissingToken => "Missing authorization token",
            AuthError::InvalidHeader(_) => "Invalid authorization header",
            AuthError::InvalidToken(_) => "Invalid token",
        };

        let body = serde_json::json!({
            "error": "unauthorized",
            "message": message
        });

        (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
    }
}

/// Extract the Bearer token from the Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidHeader("Invalid header encoding".to_string()))?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        AuthError::InvalidHeader("Authorization header must use Bearer scheme".to_string())
    })?;

    if token.trim().is_empty() {
        return Err(AuthError::MissingToken);
    }

    Ok(token.trim())
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: HasIdentityServices,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)?;

        let claims = state.jwt_manager().verify_session_token(token).map_err(|e| {
            tracing::debug!("Session token rejected: {}", e);
            AuthError::InvalidToken(e.to_string())
        })?;

        let account_id = AccountId::new(claims.sub);
        if account_id.is_blank() {
            return Err(AuthError::InvalidToken("Empty subject".to_string()));
        }

        Ok(Self { account_id })
    }
}
