use async_trait::async_trait;
use keja_core::domain::search::{ListingPage, SearchCriteria};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
}

/// Source of listing pages. Each call is self-contained: the criteria carry the
/// filters, page and limit.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, criteria: &SearchCriteria) -> Result<ListingPage, FetchError>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Fetches pages from `GET {base_url}/listings`.
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
    base_url: String,
}

impl HttpPageFetcher {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn listings_url(&self) -> String {
        format!("{}/listings", self.base_url)
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(&self, criteria: &SearchCriteria) -> Result<ListingPage, FetchError> {
        let response = self
            .client
            .get(self.listings_url())
            .query(&criteria.to_query_pairs())
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|body| body.error)
                .unwrap_or(body);
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json::<ListingPage>().await?)
    }
}
