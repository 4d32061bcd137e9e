use std::time::Duration;

use keja_core::domain::listing::Listing;
use keja_core::domain::search::{ListingPage, SearchCriteria};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::fetcher::{FetchError, PageFetcher};
use crate::session::{ApplyOutcome, FeedOptions, FeedPhase, FeedSession, PageTicket};
use crate::viewport::Viewport;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { page: u32, appended: usize },
    /// Every page of the current search is already loaded.
    Exhausted,
    /// Another fetch for this session is in flight.
    Busy,
    /// No search has loaded yet, or the first page failed.
    NotReady,
    /// The viewport is not close enough to the end of the list.
    FarFromEnd,
    /// The response belonged to a search that has since been replaced.
    Discarded,
}

#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    pub phase: FeedPhase,
    pub results: Vec<Listing>,
    pub current_page: u32,
    pub total_pages: u32,
    pub exhausted: bool,
    pub error: Option<String>,
}

/// Drives a [`FeedSession`] against a [`PageFetcher`].
///
/// The session lock is never held across a fetch, so a new search can replace
/// the session while an older page request is still outstanding.
pub struct FeedController<F> {
    fetcher: F,
    session: Mutex<FeedSession>,
    timeout: Duration,
}

impl<F: PageFetcher> FeedController<F> {
    pub fn new(fetcher: F, options: FeedOptions, timeout: Duration) -> Self {
        Self {
            fetcher,
            session: Mutex::new(FeedSession::new(options)),
            timeout,
        }
    }

    pub async fn start(&self, criteria: SearchCriteria) -> Result<LoadOutcome, FeedError> {
        let ticket = self.session.lock().await.begin_search(criteria);
        info!(filters = ?ticket.criteria(), "search started");
        self.run(ticket).await
    }

    pub async fn load_next(&self) -> Result<LoadOutcome, FeedError> {
        let ticket = {
            let mut session = self.session.lock().await;
            match session.begin_next_page() {
                Some(ticket) => ticket,
                None => return Ok(idle_reason(&session)),
            }
        };
        self.run(ticket).await
    }

    /// Proximity trigger entry point, called with the latest scroll geometry.
    pub async fn on_scroll(&self, viewport: Viewport) -> Result<LoadOutcome, FeedError> {
        let ticket = {
            let mut session = self.session.lock().await;
            if !viewport.is_near_end(session.options().proximity_threshold) {
                return Ok(LoadOutcome::FarFromEnd);
            }
            match session.on_scroll(&viewport) {
                Some(ticket) => ticket,
                None => return Ok(idle_reason(&session)),
            }
        };
        self.run(ticket).await
    }

    pub async fn reset(&self) {
        self.session.lock().await.reset();
    }

    pub async fn snapshot(&self) -> FeedSnapshot {
        let session = self.session.lock().await;
        FeedSnapshot {
            phase: session.phase(),
            results: session.results().to_vec(),
            current_page: session.current_page(),
            total_pages: session.total_pages(),
            exhausted: session.is_exhausted(),
            error: session.error().map(str::to_string),
        }
    }

    async fn run(&self, ticket: PageTicket) -> Result<LoadOutcome, FeedError> {
        let result = self.fetch(&ticket).await;
        let mut session = self.session.lock().await;
        match result {
            Ok(page) => match session.complete(&ticket, page) {
                ApplyOutcome::Applied { page, appended } => {
                    debug!(page, appended, total = session.results().len(), "page applied");
                    Ok(LoadOutcome::Loaded { page, appended })
                }
                _ => {
                    warn!(page = ticket.page(), "discarding page from superseded search");
                    Ok(LoadOutcome::Discarded)
                }
            },
            Err(err) => match session.fail(&ticket, err.to_string()) {
                ApplyOutcome::Stale => {
                    debug!(page = ticket.page(), error = %err, "ignoring failure from superseded search");
                    Ok(LoadOutcome::Discarded)
                }
                _ => {
                    warn!(page = ticket.page(), error = %err, "page fetch failed");
                    Err(err)
                }
            },
        }
    }

    async fn fetch(&self, ticket: &PageTicket) -> Result<ListingPage, FeedError> {
        match tokio::time::timeout(self.timeout, self.fetcher.fetch_page(ticket.criteria())).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(FeedError::Timeout(self.timeout)),
        }
    }
}

fn idle_reason(session: &FeedSession) -> LoadOutcome {
    match session.phase() {
        FeedPhase::FirstPageLoading | FeedPhase::NextPageLoading => LoadOutcome::Busy,
        FeedPhase::Idle | FeedPhase::Error => LoadOutcome::NotReady,
        FeedPhase::Loaded => LoadOutcome::Exhausted,
    }
}
