//! Bearer-token extractors for the listing write routes.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::debug;

use crate::http::ErrorBody;
use crate::state::AppState;
use keja_infra::auth::Identity;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("listing writes are not configured")]
    NotConfigured,
    #[error("authorization token required")]
    MissingToken,
    #[error("authorization token invalid")]
    InvalidToken,
    #[error("agent role required")]
    NotAgent,
}

/// Any caller holding a valid identity token.
#[derive(Debug, Clone)]
pub struct Caller(pub Identity);

impl FromRequestParts<AppState> for Caller {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let keys = state.tokens.as_ref().ok_or(AuthError::NotConfigured)?;
        let token = extract_bearer_token(&parts.headers).ok_or(AuthError::MissingToken)?;
        let identity = keys.verify(&token).map_err(|err| {
            debug!(error = %err, "rejected identity token");
            AuthError::InvalidToken
        })?;
        Ok(Caller(identity))
    }
}

/// A caller whose token carries the agent role. Rejects others with 403.
#[derive(Debug, Clone)]
pub struct RequireAgent(pub Identity);

impl FromRequestParts<AppState> for RequireAgent {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Caller(identity) = Caller::from_request_parts(parts, state).await?;
        if !identity.is_agent() {
            return Err(AuthError::NotAgent);
        }
        Ok(RequireAgent(identity))
    }
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let value = header.trim().strip_prefix("Bearer ")?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::MissingToken | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::NotAgent => StatusCode::FORBIDDEN,
        };
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
