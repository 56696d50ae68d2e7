// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only. Scraping and matching logic lives in
// domain functions that take these traits as arguments.

use anyhow::Result;
use async_trait::async_trait;

use crate::common::{BatchId, UrlRecordId};
use crate::domains::batches::{Batch, NewUrlRecord, UrlContentUpdate, UrlRecord, UrlType};
use crate::domains::redirects::{NewRedirect, Redirect, RedirectView};
use crate::domains::scraped_pages::{ScrapedPage, ScrapedPageInput};

// =============================================================================
// Completion Provider (LLM)
// =============================================================================

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send one user prompt and return the raw text answer
    async fn complete(&self, prompt: &str) -> Result<String>;
}

// =============================================================================
// Page Fetcher
// =============================================================================

/// A fetched page, whatever its HTTP status
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL after following redirects
    pub final_url: String,
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// GET a page. Non-2xx answers are returned, not errors; only transport
    /// failures (DNS, TLS, timeout, body read) are `Err`.
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;
}

// =============================================================================
// Repository
// =============================================================================

/// Persistence for batches, URLs, redirects and saved scrape results
#[async_trait]
pub trait UrlRepository: Send + Sync {
    async fn create_batch(&self, name: &str) -> Result<Batch>;

    async fn find_batch(&self, id: BatchId) -> Result<Option<Batch>>;

    /// Store the URL set of a batch atomically
    async fn insert_urls(&self, batch_id: BatchId, urls: &[NewUrlRecord]) -> Result<()>;

    /// Old before new, each side in submission order
    async fn list_urls(&self, batch_id: BatchId, url_type: Option<UrlType>)
        -> Result<Vec<UrlRecord>>;

    async fn update_url_content(&self, id: UrlRecordId, update: &UrlContentUpdate) -> Result<()>;

    async fn insert_redirect(&self, redirect: &NewRedirect) -> Result<Redirect>;

    /// Returns the number of rows removed
    async fn delete_redirects(&self, batch_id: BatchId) -> Result<u64>;

    /// Creation order
    async fn list_redirects(&self, batch_id: BatchId) -> Result<Vec<RedirectView>>;

    async fn upsert_scraped_page(&self, page: &ScrapedPageInput) -> Result<ScrapedPage>;

    /// Ordered by site type, then URL
    async fn list_scraped_pages(&self, batch_id: BatchId) -> Result<Vec<ScrapedPage>>;

    /// Cheap liveness check for `/health`
    async fn ping(&self) -> Result<()>;
}
