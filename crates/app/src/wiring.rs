use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::state::AppState;
use keja_infra::auth::TokenKeys;
use keja_infra::db::{connect_lazy, run_migrations, DbPoolError, PgListingStore};
use keja_infra::store::{ListingStore, MemoryStore};

#[derive(Debug, Error)]
pub enum WiringError {
    #[error("db error: {0}")]
    Db(#[from] DbPoolError),
}

pub async fn build_state(config: AppConfig) -> Result<AppState, WiringError> {
    let store: Arc<dyn ListingStore> = match config.database_url.as_deref() {
        Some(url) => {
            let pool = connect_lazy(url, config.db_max_connections)?;
            run_migrations(&pool).await?;
            info!("postgres listing store ready");
            Arc::new(PgListingStore::new(pool))
        }
        None => {
            warn!("KEJA_DATABASE_URL not set, listings are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };
    let tokens = config
        .token_secret
        .as_deref()
        .map(|secret| Arc::new(TokenKeys::from_secret(secret)));
    if tokens.is_none() {
        warn!("KEJA_TOKEN_SECRET not set, listing writes are disabled");
    }
    Ok(AppState {
        config: Arc::new(config),
        store,
        tokens,
    })
}
