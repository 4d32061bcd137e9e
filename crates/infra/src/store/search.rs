use keja_core::domain::listing::Listing;
use keja_core::domain::search::{ListingFilter, ListingPage, ListingSort, Pagination, SearchCriteria};
use tracing::debug;

use super::{ListingStore, StoreError};

/// Runs one search: a bounded page fetch plus an independent count over the same
/// filter. The two reads are not a snapshot; concurrent writes may shift them.
pub async fn search_listings(
    store: &dyn ListingStore,
    criteria: &SearchCriteria,
) -> Result<ListingPage, StoreError> {
    let query = criteria.query();
    debug!(?query, backend = store.backend(), "built listing query");
    let listings = store.find_page(&query).await?;
    let matching = store.count(&query.filter).await?;
    let pagination = Pagination::compute(criteria.page, criteria.limit, matching);
    debug!(
        matching,
        returned = listings.len(),
        page = pagination.current,
        total_pages = pagination.total,
        "listing search complete"
    );
    Ok(ListingPage {
        listings,
        pagination,
    })
}

/// Unpaginated available listings for a city, newest first.
pub async fn listings_in_city(
    store: &dyn ListingStore,
    city: &str,
) -> Result<Vec<Listing>, StoreError> {
    let filter = ListingFilter::for_city(city.trim());
    store.find_all(&filter, ListingSort::NewestFirst).await
}
