pub mod memory;
pub mod search;

use async_trait::async_trait;
use keja_core::domain::listing::Listing;
use keja_core::domain::search::{ListingFilter, ListingQuery, ListingSort};
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use search::{listings_in_city, search_listings};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid stored row: {0}")]
    InvalidRow(String),
}

/// Filter/sort/skip/limit contract the search core relies on.
///
/// Implementations must apply `ListingSort` exactly, so that consecutive pages
/// of one filter never overlap.
#[async_trait]
pub trait ListingStore: Send + Sync {
    fn backend(&self) -> &'static str;

    async fn find_page(&self, query: &ListingQuery) -> Result<Vec<Listing>, StoreError>;

    async fn count(&self, filter: &ListingFilter) -> Result<u64, StoreError>;

    async fn find_all(
        &self,
        filter: &ListingFilter,
        sort: ListingSort,
    ) -> Result<Vec<Listing>, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<Listing>, StoreError>;

    async fn insert(&self, listing: &Listing) -> Result<(), StoreError>;

    /// Overwrites the stored listing with the same id. Returns false when absent.
    async fn replace(&self, listing: &Listing) -> Result<bool, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}
