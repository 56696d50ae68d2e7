//! RedirectPipeline - the batch workflow behind the HTTP routes and the CLI.
//!
//! create batch -> scrape -> match -> list / export. Each step can be run on
//! its own; none checks that the previous one happened.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::common::BatchId;
use crate::config::PipelineConfig;
use crate::domains::batches::{Batch, NewBatch, NewUrlRecord, UrlRecord, UrlType};
use crate::domains::extraction::{self, ScrapeOptions, ScrapeResult, ScrapeSummary};
use crate::domains::matching::{self, MatchSummary};
use crate::domains::redirects::{render_export, ExportFormat, RedirectView};
use crate::domains::scraped_pages::{ScrapedPage, ScrapedPageInput};
use crate::kernel::{RunRegistry, ServerDeps, WorkQueue};

/// Raised when a batch-scoped job names a batch that does not exist
#[derive(Debug, thiserror::Error)]
#[error("batch {0} not found")]
pub struct BatchNotFound(pub BatchId);

#[derive(Clone)]
pub struct RedirectPipeline {
    deps: ServerDeps,
    config: PipelineConfig,
    runs: Arc<RunRegistry>,
}

impl RedirectPipeline {
    pub fn new(deps: ServerDeps, config: PipelineConfig) -> Self {
        Self {
            deps,
            config,
            runs: RunRegistry::new(),
        }
    }

    pub fn deps(&self) -> &ServerDeps {
        &self.deps
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Store the batch and its URL lists. The URL set is written atomically;
    /// if that fails the batch row stays behind without URLs.
    pub async fn create_batch(&self, batch: NewBatch) -> Result<Batch> {
        let created = self.deps.repo.create_batch(&batch.name).await?;
        let urls = NewUrlRecord::from_lists(&batch.old_urls, &batch.new_urls);
        self.deps.repo.insert_urls(created.id, &urls).await?;

        info!(
            batch_id = %created.id,
            name = %created.name,
            old_urls = batch.old_urls.len(),
            new_urls = batch.new_urls.len(),
            "Batch created"
        );
        Ok(created)
    }

    pub async fn find_batch(&self, batch_id: BatchId) -> Result<Option<Batch>> {
        self.deps.repo.find_batch(batch_id).await
    }

    async fn require_batch(&self, batch_id: BatchId) -> Result<Batch> {
        self.find_batch(batch_id)
            .await?
            .ok_or_else(|| BatchNotFound(batch_id).into())
    }

    pub async fn scrape_batch(
        &self,
        batch_id: BatchId,
        options: ScrapeOptions,
    ) -> Result<ScrapeSummary> {
        self.require_batch(batch_id).await?;

        let run = self.runs.start(batch_id);
        let queue = WorkQueue::new(self.config.scrape_concurrency).with_delay(self.config.scrape_delay);

        extraction::scrape_batch(batch_id, &options, &queue, run.token(), &self.deps).await
    }

    /// Ad-hoc extraction of a single URL; nothing is stored.
    pub async fn scrape_url(&self, url: &str) -> ScrapeResult {
        extraction::scrape_url(url, self.deps.fetcher.as_ref()).await
    }

    pub async fn match_batch(&self, batch_id: BatchId) -> Result<MatchSummary> {
        self.require_batch(batch_id).await?;

        let run = self.runs.start(batch_id);
        matching::match_batch(batch_id, &self.config, run.token(), &self.deps).await
    }

    /// Stop the running scrape/match jobs of a batch. Work already written
    /// stays; returns false when nothing was running.
    pub fn cancel(&self, batch_id: BatchId) -> bool {
        let cancelled = self.runs.cancel(batch_id);
        if cancelled {
            info!(batch_id = %batch_id, "Batch run cancelled");
        }
        cancelled
    }

    pub async fn list_urls(
        &self,
        batch_id: BatchId,
        url_type: Option<UrlType>,
    ) -> Result<Vec<UrlRecord>> {
        self.deps.repo.list_urls(batch_id, url_type).await
    }

    pub async fn list_redirects(&self, batch_id: BatchId) -> Result<Vec<RedirectView>> {
        self.deps.repo.list_redirects(batch_id).await
    }

    pub async fn export(&self, batch_id: BatchId, format: ExportFormat) -> Result<String> {
        let redirects = self.list_redirects(batch_id).await?;
        Ok(render_export(format, &redirects))
    }

    pub async fn save_scraped_page(&self, page: ScrapedPageInput) -> Result<ScrapedPage> {
        self.deps.repo.upsert_scraped_page(&page).await
    }

    pub async fn list_scraped_pages(&self, batch_id: BatchId) -> Result<Vec<ScrapedPage>> {
        self.deps.repo.list_scraped_pages(batch_id).await
    }
}
