use std::sync::Arc;

use crate::config::AppConfig;
use keja_infra::auth::TokenKeys;
use keja_infra::store::ListingStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn ListingStore>,
    /// `None` when no token secret is configured; mutating routes are then unavailable.
    pub tokens: Option<Arc<TokenKeys>>,
}
