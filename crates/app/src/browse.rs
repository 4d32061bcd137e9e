use reqwest::Client;
use thiserror::Error;
use tracing::{info, warn};

use crate::cli::BrowseArgs;
use crate::config::AppConfig;
use keja_core::domain::criteria::{parse_criteria, CriteriaError};
use keja_feed::{FeedController, FeedError, FeedSnapshot, HttpPageFetcher, LoadOutcome, Viewport};

/// Height of one rendered result card, used to simulate scroll geometry.
const ROW_HEIGHT: f64 = 320.0;
const VIEWPORT_HEIGHT: f64 = 800.0;
const MAX_NEXT_PAGE_RETRIES: u32 = 2;

#[derive(Debug, Error)]
pub enum BrowseError {
    #[error("invalid criteria: {0}")]
    Criteria(#[from] CriteriaError),
    #[error("http client error: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("feed error: {0}")]
    Feed(#[from] FeedError),
}

/// Runs one search against the API and keeps scrolling to the bottom of the
/// list until every page is loaded or `max_pages` is reached.
pub async fn run(config: &AppConfig, args: &BrowseArgs) -> Result<(), BrowseError> {
    let criteria = parse_criteria(args.raw_criteria(), config.page_limits)?;
    let client = Client::builder().build()?;
    let fetcher = HttpPageFetcher::new(client, &config.api_base_url);
    let feed = FeedController::new(fetcher, config.feed_options(), config.feed_timeout);

    info!(base_url = %config.api_base_url, ?criteria, "browsing listings");
    feed.start(criteria).await?;
    let mut snapshot = feed.snapshot().await;
    report(&snapshot, 0);

    let mut retries = 0;
    while snapshot.current_page < args.max_pages {
        let shown = snapshot.results.len();
        match feed.on_scroll(scrolled_to_bottom(shown)).await {
            Ok(LoadOutcome::Loaded { .. }) => {
                retries = 0;
                snapshot = feed.snapshot().await;
                report(&snapshot, shown);
            }
            Ok(outcome) => {
                info!(?outcome, shown, "browsing finished");
                break;
            }
            Err(err) if retries < MAX_NEXT_PAGE_RETRIES => {
                retries += 1;
                warn!(error = %err, retries, "next page failed, scrolling again");
            }
            Err(err) => return Err(err.into()),
        }
    }
    info!(
        loaded = snapshot.results.len(),
        pages = snapshot.current_page,
        total_pages = snapshot.total_pages,
        "browse complete"
    );
    Ok(())
}

fn scrolled_to_bottom(rows: usize) -> Viewport {
    let content_height = rows as f64 * ROW_HEIGHT;
    let scroll_offset = (content_height - VIEWPORT_HEIGHT).max(0.0);
    Viewport::new(scroll_offset, VIEWPORT_HEIGHT, content_height)
}

fn report(snapshot: &FeedSnapshot, from: usize) {
    info!(
        page = snapshot.current_page,
        total_pages = snapshot.total_pages,
        loaded = snapshot.results.len(),
        "page loaded"
    );
    for listing in snapshot.results.iter().skip(from) {
        info!(
            id = %listing.id,
            city = %listing.address.city,
            price = listing.price,
            bedrooms = listing.bedrooms,
            "{}",
            listing.title
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bottom_of_list_is_near_end() {
        let viewport = scrolled_to_bottom(6);
        assert_eq!(viewport.remaining(), 0.0);
        assert!(viewport.is_near_end(keja_feed::viewport::DEFAULT_PROXIMITY_THRESHOLD));
    }

    #[test]
    fn empty_list_does_not_scroll() {
        let viewport = scrolled_to_bottom(0);
        assert_eq!(viewport.scroll_offset, 0.0);
    }
}
