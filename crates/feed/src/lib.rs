pub mod controller;
pub mod fetcher;
pub mod session;
pub mod viewport;

pub use controller::{FeedController, FeedError, FeedSnapshot, LoadOutcome, DEFAULT_FETCH_TIMEOUT};
pub use fetcher::{FetchError, HttpPageFetcher, PageFetcher};
pub use session::{FeedOptions, FeedPhase, FeedSession, DEFAULT_PAGE_SIZE};
pub use viewport::Viewport;
