use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::{debug, error};

use crate::http::ErrorBody;
use crate::state::AppState;
use keja_core::domain::criteria::{parse_criteria, CriteriaError, RawCriteria};
use keja_core::domain::listing::Listing;
use keja_core::domain::search::ListingPage;
use keja_infra::store::{listings_in_city, search_listings, StoreError};

#[derive(Debug, Error)]
pub enum SearchApiError {
    #[error("invalid query string: {0}")]
    Query(String),
    #[error("{0}")]
    Criteria(#[from] CriteriaError),
    #[error("search failure: {0}")]
    Store(#[from] StoreError),
}

pub async fn search(
    State(state): State<AppState>,
    params: Result<Query<RawCriteria>, QueryRejection>,
) -> Result<Json<ListingPage>, SearchApiError> {
    let Query(raw) = params.map_err(|rejection| SearchApiError::Query(rejection.body_text()))?;
    let criteria = parse_criteria(raw, state.config.page_limits)?;
    debug!(?criteria, "parsed listing search");
    let page = search_listings(state.store.as_ref(), &criteria).await?;
    Ok(Json(page))
}

pub async fn by_city(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Result<Json<Vec<Listing>>, SearchApiError> {
    let listings = listings_in_city(state.store.as_ref(), &city).await?;
    debug!(city = %city, count = listings.len(), "listings by city");
    Ok(Json(listings))
}

impl IntoResponse for SearchApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            SearchApiError::Query(_) | SearchApiError::Criteria(_) => StatusCode::BAD_REQUEST,
            SearchApiError::Store(err) => {
                error!(error = %err, "listing search failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
