use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::http::middleware::auth::RequireAgent;
use crate::http::ErrorBody;
use crate::state::AppState;
use keja_core::domain::listing::{Listing, ListingPatch, NewListing};
use keja_infra::store::StoreError;

#[derive(Debug, Error)]
pub enum ListingsApiError {
    #[error("invalid body: {0}")]
    Body(String),
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("listing not found")]
    NotFound,
    #[error("only the owning agent may change this listing")]
    NotOwner,
    #[error("storage failure: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn get_listing(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Listing>, ListingsApiError> {
    let id = parse_id(&id)?;
    let listing = state.store.get(id).await?.ok_or(ListingsApiError::NotFound)?;
    Ok(Json(listing))
}

pub async fn create_listing(
    State(state): State<AppState>,
    RequireAgent(agent): RequireAgent,
    payload: Result<Json<NewListing>, JsonRejection>,
) -> Result<(StatusCode, Json<Listing>), ListingsApiError> {
    let Json(payload) = payload.map_err(|rejection| ListingsApiError::Body(rejection.body_text()))?;
    payload.validate()?;
    let listing = payload.into_listing(&agent.subject, Utc::now());
    state.store.insert(&listing).await?;
    info!(id = %listing.id, agent = %agent.subject, city = %listing.address.city, "listing created");
    Ok((StatusCode::CREATED, Json(listing)))
}

pub async fn update_listing(
    State(state): State<AppState>,
    RequireAgent(agent): RequireAgent,
    Path(id): Path<String>,
    payload: Result<Json<ListingPatch>, JsonRejection>,
) -> Result<Json<Listing>, ListingsApiError> {
    let id = parse_id(&id)?;
    let Json(patch) = payload.map_err(|rejection| ListingsApiError::Body(rejection.body_text()))?;
    patch.validate()?;
    let mut listing = owned_listing(&state, id, &agent.subject).await?;
    listing.apply_patch(patch, Utc::now());
    if !state.store.replace(&listing).await? {
        return Err(ListingsApiError::NotFound);
    }
    info!(id = %listing.id, agent = %agent.subject, "listing updated");
    Ok(Json(listing))
}

pub async fn delete_listing(
    State(state): State<AppState>,
    RequireAgent(agent): RequireAgent,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ListingsApiError> {
    let id = parse_id(&id)?;
    owned_listing(&state, id, &agent.subject).await?;
    if !state.store.delete(id).await? {
        return Err(ListingsApiError::NotFound);
    }
    info!(id = %id, agent = %agent.subject, "listing deleted");
    Ok(Json(MessageResponse {
        message: "Listing deleted".to_string(),
    }))
}

/// Ids that do not parse cannot name a stored listing, so they are reported as
/// missing rather than malformed.
fn parse_id(raw: &str) -> Result<Uuid, ListingsApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ListingsApiError::NotFound)
}

async fn owned_listing(state: &AppState, id: Uuid, agent: &str) -> Result<Listing, ListingsApiError> {
    let listing = state.store.get(id).await?.ok_or(ListingsApiError::NotFound)?;
    if !listing.is_owned_by(agent) {
        return Err(ListingsApiError::NotOwner);
    }
    Ok(listing)
}

impl IntoResponse for ListingsApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ListingsApiError::Body(_) | ListingsApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ListingsApiError::NotFound => StatusCode::NOT_FOUND,
            ListingsApiError::NotOwner => StatusCode::FORBIDDEN,
            ListingsApiError::Store(err) => {
                error!(error = %err, "listing storage failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
