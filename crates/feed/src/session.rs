//! Result state for one browsing session.
//!
//! `FeedSession` is a synchronous state machine. It never performs I/O: callers
//! take a [`PageTicket`] out of it, fetch the page however they like, and hand
//! the outcome back. Tickets from a superseded search are recognised and dropped,
//! so a late response can never leak into the current result list.

use keja_core::domain::listing::Listing;
use keja_core::domain::search::{ListingPage, SearchCriteria};

use crate::viewport::{Viewport, DEFAULT_PROXIMITY_THRESHOLD};

pub const DEFAULT_PAGE_SIZE: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPhase {
    Idle,
    FirstPageLoading,
    Loaded,
    NextPageLoading,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    First,
    Next,
}

/// Permission to fetch exactly one page for exactly one search generation.
#[derive(Debug, Clone)]
pub struct PageTicket {
    generation: u64,
    kind: PageKind,
    criteria: SearchCriteria,
}

impl PageTicket {
    pub fn kind(&self) -> PageKind {
        self.kind
    }

    pub fn page(&self) -> u32 {
        self.criteria.page
    }

    pub fn criteria(&self) -> &SearchCriteria {
        &self.criteria
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied { page: u32, appended: usize },
    Failed,
    Stale,
}

#[derive(Debug, Clone, Copy)]
pub struct FeedOptions {
    pub page_size: u32,
    pub proximity_threshold: f64,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            proximity_threshold: DEFAULT_PROXIMITY_THRESHOLD,
        }
    }
}

#[derive(Debug)]
pub struct FeedSession {
    options: FeedOptions,
    generation: u64,
    results: Vec<Listing>,
    current_page: u32,
    total_pages: u32,
    last_filters: Option<SearchCriteria>,
    fetching_first_page: bool,
    fetching_next_page: bool,
    first_page_failed: bool,
    error: Option<String>,
}

impl FeedSession {
    pub fn new(options: FeedOptions) -> Self {
        Self {
            options: FeedOptions {
                page_size: options.page_size.max(1),
                ..options
            },
            generation: 0,
            results: Vec::new(),
            current_page: 1,
            total_pages: 1,
            last_filters: None,
            fetching_first_page: false,
            fetching_next_page: false,
            first_page_failed: false,
            error: None,
        }
    }

    pub fn options(&self) -> FeedOptions {
        self.options
    }

    /// Replaces the whole session. Any ticket handed out before this call is stale.
    pub fn begin_search(&mut self, criteria: SearchCriteria) -> PageTicket {
        self.generation += 1;
        let criteria = criteria.with_page(1, self.options.page_size);
        self.results.clear();
        self.current_page = 1;
        self.total_pages = 1;
        self.last_filters = Some(criteria.clone());
        self.fetching_first_page = true;
        self.fetching_next_page = false;
        self.first_page_failed = false;
        self.error = None;
        PageTicket {
            generation: self.generation,
            kind: PageKind::First,
            criteria,
        }
    }

    /// Ticket for the following page, or `None` when a fetch is in flight, the
    /// session is not loaded, or every page has been fetched.
    pub fn begin_next_page(&mut self) -> Option<PageTicket> {
        if self.phase() != FeedPhase::Loaded || self.is_exhausted() {
            return None;
        }
        let filters = self.last_filters.as_ref()?;
        let criteria = filters.with_page(self.current_page + 1, self.options.page_size);
        self.fetching_next_page = true;
        Some(PageTicket {
            generation: self.generation,
            kind: PageKind::Next,
            criteria,
        })
    }

    /// Proximity trigger: requests the next page once the remaining scroll
    /// distance drops under the threshold.
    pub fn on_scroll(&mut self, viewport: &Viewport) -> Option<PageTicket> {
        if !viewport.is_near_end(self.options.proximity_threshold) {
            return None;
        }
        self.begin_next_page()
    }

    pub fn complete(&mut self, ticket: &PageTicket, page: ListingPage) -> ApplyOutcome {
        if !self.is_current(ticket) {
            return ApplyOutcome::Stale;
        }
        let appended = page.listings.len();
        match ticket.kind {
            PageKind::First => {
                self.results = page.listings;
                self.current_page = 1;
                self.fetching_first_page = false;
            }
            PageKind::Next => {
                self.results.extend(page.listings);
                self.current_page = ticket.page();
                self.fetching_next_page = false;
            }
        }
        self.total_pages = page.pagination.total.max(1);
        self.error = None;
        ApplyOutcome::Applied {
            page: ticket.page(),
            appended,
        }
    }

    /// A failed first page clears the session; a failed next page keeps what
    /// is already loaded so a later trigger can retry.
    pub fn fail(&mut self, ticket: &PageTicket, message: impl Into<String>) -> ApplyOutcome {
        if !self.is_current(ticket) {
            return ApplyOutcome::Stale;
        }
        match ticket.kind {
            PageKind::First => {
                self.results.clear();
                self.total_pages = 1;
                self.fetching_first_page = false;
                self.first_page_failed = true;
            }
            PageKind::Next => {
                self.fetching_next_page = false;
            }
        }
        self.error = Some(message.into());
        ApplyOutcome::Failed
    }

    pub fn reset(&mut self) {
        let options = self.options;
        let generation = self.generation + 1;
        *self = FeedSession::new(options);
        self.generation = generation;
    }

    pub fn phase(&self) -> FeedPhase {
        if self.fetching_first_page {
            FeedPhase::FirstPageLoading
        } else if self.fetching_next_page {
            FeedPhase::NextPageLoading
        } else if self.first_page_failed {
            FeedPhase::Error
        } else if self.last_filters.is_none() {
            FeedPhase::Idle
        } else {
            FeedPhase::Loaded
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.phase() == FeedPhase::Loaded && self.current_page >= self.total_pages
    }

    pub fn results(&self) -> &[Listing] {
        &self.results
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn last_filters(&self) -> Option<&SearchCriteria> {
        self.last_filters.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_fetching_first_page(&self) -> bool {
        self.fetching_first_page
    }

    pub fn is_fetching_next_page(&self) -> bool {
        self.fetching_next_page
    }

    fn is_current(&self, ticket: &PageTicket) -> bool {
        if ticket.generation != self.generation {
            return false;
        }
        let Some(filters) = self.last_filters.as_ref() else {
            return false;
        };
        if !filters.same_filters(&ticket.criteria) {
            return false;
        }
        match ticket.kind {
            PageKind::First => self.fetching_first_page,
            PageKind::Next => {
                self.fetching_next_page && ticket.page() == self.current_page + 1
            }
        }
    }
}

impl Default for FeedSession {
    fn default() -> Self {
        Self::new(FeedOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{TimeZone, Utc};
    use keja_core::domain::listing::{Address, ContactInfo};
    use keja_core::domain::search::Pagination;
    use keja_core::types::property_type::PropertyType;
    use uuid::Uuid;

    use super::*;

    fn listing(title: &str) -> Listing {
        let now = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        Listing {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: String::new(),
            price: 5000.0,
            address: Address {
                city: "Juja".to_string(),
                street: None,
                coordinates: None,
            },
            property_type: PropertyType::Studio,
            bedrooms: 0,
            bathrooms: 1,
            amenities: BTreeMap::new(),
            images: Vec::new(),
            contact_info: ContactInfo {
                phone: None,
                email: None,
                agent_id: "agent".to_string(),
            },
            is_available: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn page(prefix: &str, count: usize, page: u32, matching: u64) -> ListingPage {
        ListingPage {
            listings: (0..count).map(|i| listing(&format!("{prefix}-{page}-{i}"))).collect(),
            pagination: Pagination::compute(page, DEFAULT_PAGE_SIZE, matching),
        }
    }

    fn juja() -> SearchCriteria {
        SearchCriteria {
            city: Some("juja".to_string()),
            ..SearchCriteria::default()
        }
    }

    #[test]
    fn starts_idle() {
        let session = FeedSession::default();
        assert_eq!(session.phase(), FeedPhase::Idle);
        assert!(!session.is_exhausted());
    }

    #[test]
    fn search_forces_first_page_and_client_page_size() {
        let mut session = FeedSession::default();
        let ticket = session.begin_search(SearchCriteria {
            page: 4,
            limit: 50,
            ..juja()
        });
        assert_eq!(ticket.kind(), PageKind::First);
        assert_eq!(ticket.page(), 1);
        assert_eq!(ticket.criteria().limit, DEFAULT_PAGE_SIZE);
        assert_eq!(session.phase(), FeedPhase::FirstPageLoading);
        assert!(session.is_fetching_first_page());
    }

    #[test]
    fn juja_walk_appends_in_order_until_exhausted() {
        let mut session = FeedSession::default();
        let first = session.begin_search(juja());
        assert_eq!(
            session.complete(&first, page("a", 6, 1, 13)),
            ApplyOutcome::Applied { page: 1, appended: 6 }
        );
        assert_eq!((session.current_page(), session.total_pages()), (1, 3));

        let second = session.begin_next_page().unwrap();
        assert_eq!(second.page(), 2);
        assert_eq!(session.phase(), FeedPhase::NextPageLoading);
        session.complete(&second, page("a", 6, 2, 13));
        assert_eq!(session.results().len(), 12);

        let third = session.begin_next_page().unwrap();
        session.complete(&third, page("a", 1, 3, 13));
        assert_eq!(session.results().len(), 13);
        assert!(session.is_exhausted());
        assert!(session.begin_next_page().is_none());

        let titles: Vec<&str> = session.results().iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles[0], "a-1-0");
        assert_eq!(titles[6], "a-2-0");
        assert_eq!(titles[12], "a-3-0");
    }

    #[test]
    fn only_one_next_page_in_flight() {
        let mut session = FeedSession::default();
        let first = session.begin_search(juja());
        session.complete(&first, page("a", 6, 1, 13));
        assert!(session.begin_next_page().is_some());
        assert!(session.begin_next_page().is_none());
        assert!(session.on_scroll(&Viewport::new(0.0, 800.0, 900.0)).is_none());
    }

    #[test]
    fn no_next_page_while_first_page_loads() {
        let mut session = FeedSession::default();
        session.begin_search(juja());
        assert!(session.begin_next_page().is_none());
    }

    #[test]
    fn scroll_far_from_end_does_not_trigger() {
        let mut session = FeedSession::default();
        let first = session.begin_search(juja());
        session.complete(&first, page("a", 6, 1, 13));
        assert!(session.on_scroll(&Viewport::new(0.0, 800.0, 4000.0)).is_none());
        assert!(session.on_scroll(&Viewport::new(3100.0, 800.0, 4000.0)).is_some());
    }

    #[test]
    fn late_response_from_old_search_is_discarded() {
        let mut session = FeedSession::default();
        let first = session.begin_search(juja());
        session.complete(&first, page("a", 6, 1, 13));
        let old_next = session.begin_next_page().unwrap();

        let thika = SearchCriteria {
            city: Some("thika".to_string()),
            ..SearchCriteria::default()
        };
        let new_first = session.begin_search(thika);
        assert_eq!(session.complete(&old_next, page("a", 6, 2, 13)), ApplyOutcome::Stale);
        assert!(session.results().is_empty());

        session.complete(&new_first, page("b", 2, 1, 2));
        assert_eq!(session.complete(&old_next, page("a", 6, 2, 13)), ApplyOutcome::Stale);
        assert_eq!(session.results().len(), 2);
        assert!(session.results().iter().all(|l| l.title.starts_with("b-")));
    }

    #[test]
    fn same_filters_resubmitted_still_invalidates_old_ticket() {
        let mut session = FeedSession::default();
        let first = session.begin_search(juja());
        session.complete(&first, page("a", 6, 1, 13));
        let old_next = session.begin_next_page().unwrap();
        session.begin_search(juja());
        assert_eq!(session.fail(&old_next, "boom"), ApplyOutcome::Stale);
        assert_eq!(session.phase(), FeedPhase::FirstPageLoading);
        assert!(session.error().is_none());
    }

    #[test]
    fn failed_first_page_clears_results() {
        let mut session = FeedSession::default();
        let first = session.begin_search(juja());
        assert_eq!(session.fail(&first, "server error"), ApplyOutcome::Failed);
        assert_eq!(session.phase(), FeedPhase::Error);
        assert!(session.results().is_empty());
        assert_eq!(session.error(), Some("server error"));
        assert!(session.begin_next_page().is_none());
    }

    #[test]
    fn failed_next_page_keeps_results_and_can_retry() {
        let mut session = FeedSession::default();
        let first = session.begin_search(juja());
        session.complete(&first, page("a", 6, 1, 13));
        let second = session.begin_next_page().unwrap();
        session.fail(&second, "timeout");
        assert_eq!(session.phase(), FeedPhase::Loaded);
        assert_eq!(session.results().len(), 6);
        assert_eq!(session.error(), Some("timeout"));

        let retry = session.begin_next_page().unwrap();
        assert_eq!(retry.page(), 2);
        session.complete(&retry, page("a", 6, 2, 13));
        assert_eq!(session.results().len(), 12);
        assert!(session.error().is_none());
    }

    #[test]
    fn reset_returns_to_idle_and_invalidates_tickets() {
        let mut session = FeedSession::default();
        let first = session.begin_search(juja());
        session.reset();
        assert_eq!(session.phase(), FeedPhase::Idle);
        assert_eq!(session.complete(&first, page("a", 6, 1, 13)), ApplyOutcome::Stale);
        assert!(session.results().is_empty());
    }
}
