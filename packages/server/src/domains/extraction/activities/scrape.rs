//! Scrape activities
//!
//! A failed fetch is recorded on the URL row and never aborts the batch.

use anyhow::Result;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::common::BatchId;
use crate::domains::batches::{UrlRecord, UrlType};
use crate::domains::extraction::extractor::extract_page;
use crate::domains::extraction::models::ScrapeResult;
use crate::kernel::{PageFetcher, ServerDeps, WorkQueue};

#[derive(Debug, Clone, Default)]
pub struct ScrapeOptions {
    /// Scrape only the first N old URLs; new URLs are always scraped
    pub max_rows: Option<usize>,
    /// Skip URLs that already carry a scrape result
    pub resume: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScrapeSummary {
    pub scraped: usize,
    pub failed: usize,
    /// Already scraped by an earlier run (resume only)
    pub skipped: usize,
    /// Never started because the run was cancelled
    pub pending: usize,
    pub cancelled: bool,
}

enum Outcome {
    Scraped,
    FetchFailed,
    StoreFailed,
}

/// Fetch one URL and extract its fields. Never fails: transport errors are
/// reported inside the result.
pub async fn scrape_url(url: &str, fetcher: &dyn PageFetcher) -> ScrapeResult {
    match fetcher.fetch(url).await {
        Ok(page) => {
            let content = extract_page(&page.body);
            ScrapeResult::from_page(url, page.status, content)
        }
        Err(e) => {
            warn!(url = %url, error = %e, "Scrape failed");
            ScrapeResult::failed(url, format!("{:#}", e))
        }
    }
}

/// Scrape the URLs of a batch and write each result back as soon as it is
/// known, so an interrupted run can continue with `resume`.
pub async fn scrape_batch(
    batch_id: BatchId,
    options: &ScrapeOptions,
    queue: &WorkQueue,
    token: &CancellationToken,
    deps: &ServerDeps,
) -> Result<ScrapeSummary> {
    let records = deps.repo.list_urls(batch_id, None).await?;
    let mut targets = select_targets(records, options.max_rows);

    let total = targets.len();
    if options.resume {
        targets.retain(|record| record.scraped_at.is_none());
    }
    let skipped = total - targets.len();

    info!(
        batch_id = %batch_id,
        urls = targets.len(),
        skipped,
        concurrency = queue.concurrency(),
        "Scraping batch"
    );

    let report = queue
        .run(targets, token, |record| async move {
            let result = scrape_url(&record.url, deps.fetcher.as_ref()).await;
            let fetched = result.is_success();

            if let Err(e) = deps.repo.update_url_content(record.id, &result.into()).await {
                error!(url = %record.url, error = %e, "Failed to store scrape result");
                return Outcome::StoreFailed;
            }

            if fetched {
                Outcome::Scraped
            } else {
                Outcome::FetchFailed
            }
        })
        .await;

    let mut summary = ScrapeSummary {
        skipped,
        pending: report.not_started,
        cancelled: report.cancelled,
        ..Default::default()
    };
    for outcome in &report.results {
        match outcome {
            Outcome::Scraped => summary.scraped += 1,
            Outcome::FetchFailed | Outcome::StoreFailed => summary.failed += 1,
        }
    }

    info!(
        batch_id = %batch_id,
        scraped = summary.scraped,
        failed = summary.failed,
        pending = summary.pending,
        cancelled = summary.cancelled,
        "Batch scrape finished"
    );

    Ok(summary)
}

/// Old URLs (capped at `max_rows`) followed by every new URL, each in
/// list order.
fn select_targets(records: Vec<UrlRecord>, max_rows: Option<usize>) -> Vec<UrlRecord> {
    let (old, new): (Vec<_>, Vec<_>) = records
        .into_iter()
        .partition(|record| record.url_type == UrlType::Old);

    let cap = max_rows.unwrap_or(usize::MAX);
    old.into_iter().take(cap).chain(new).collect()
}
