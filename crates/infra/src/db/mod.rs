pub mod listings_repo;
pub mod pool;

pub use listings_repo::PgListingStore;
pub use pool::{connect_lazy, run_migrations, DbPool, DbPoolError};
