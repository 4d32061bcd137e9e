use async_trait::async_trait;
use keja_core::domain::listing::Listing;
use keja_core::domain::search::{ListingFilter, ListingQuery, ListingSort};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ListingStore, StoreError};

/// Process-local store. Used when no database is configured and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    listings: RwLock<Vec<Listing>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listings(listings: Vec<Listing>) -> Self {
        Self {
            listings: RwLock::new(listings),
        }
    }

    async fn matching(&self, filter: &ListingFilter, sort: ListingSort) -> Vec<Listing> {
        let listings = self.listings.read().await;
        let mut matched: Vec<Listing> = listings
            .iter()
            .filter(|listing| filter.matches(listing))
            .cloned()
            .collect();
        matched.sort_by(|a, b| sort.compare(a, b));
        matched
    }
}

#[async_trait]
impl ListingStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn find_page(&self, query: &ListingQuery) -> Result<Vec<Listing>, StoreError> {
        let matched = self.matching(&query.filter, query.sort).await;
        let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit).unwrap_or(usize::MAX);
        Ok(matched.into_iter().skip(skip).take(limit).collect())
    }

    async fn count(&self, filter: &ListingFilter) -> Result<u64, StoreError> {
        let listings = self.listings.read().await;
        let count = listings.iter().filter(|listing| filter.matches(listing)).count();
        Ok(count as u64)
    }

    async fn find_all(
        &self,
        filter: &ListingFilter,
        sort: ListingSort,
    ) -> Result<Vec<Listing>, StoreError> {
        Ok(self.matching(filter, sort).await)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Listing>, StoreError> {
        let listings = self.listings.read().await;
        Ok(listings.iter().find(|listing| listing.id == id).cloned())
    }

    async fn insert(&self, listing: &Listing) -> Result<(), StoreError> {
        let mut listings = self.listings.write().await;
        if listings.iter().any(|existing| existing.id == listing.id) {
            return Err(StoreError::InvalidRow(format!(
                "duplicate listing id {}",
                listing.id
            )));
        }
        listings.push(listing.clone());
        Ok(())
    }

    async fn replace(&self, listing: &Listing) -> Result<bool, StoreError> {
        let mut listings = self.listings.write().await;
        match listings.iter_mut().find(|existing| existing.id == listing.id) {
            Some(existing) => {
                *existing = listing.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut listings = self.listings.write().await;
        let before = listings.len();
        listings.retain(|listing| listing.id != id);
        Ok(listings.len() != before)
    }
}
