//! Postgres-backed UrlRepository, delegating to the model query methods

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;

use super::UrlRepository;
use crate::common::{BatchId, UrlRecordId};
use crate::domains::batches::{Batch, NewUrlRecord, UrlContentUpdate, UrlRecord, UrlType};
use crate::domains::redirects::{NewRedirect, Redirect, RedirectView};
use crate::domains::scraped_pages::{ScrapedPage, ScrapedPageInput};

#[derive(Clone)]
pub struct PgUrlRepository {
    pool: PgPool,
}

impl PgUrlRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UrlRepository for PgUrlRepository {
    async fn create_batch(&self, name: &str) -> Result<Batch> {
        Batch::create(name, &self.pool)
            .await
            .context("Failed to insert batch")
    }

    async fn find_batch(&self, id: BatchId) -> Result<Option<Batch>> {
        Batch::find_by_id_optional(id, &self.pool).await
    }

    async fn insert_urls(&self, batch_id: BatchId, urls: &[NewUrlRecord]) -> Result<()> {
        UrlRecord::insert_many(batch_id, urls, &self.pool)
            .await
            .context("Failed to insert urls")
    }

    async fn list_urls(
        &self,
        batch_id: BatchId,
        url_type: Option<UrlType>,
    ) -> Result<Vec<UrlRecord>> {
        UrlRecord::find_by_batch(batch_id, url_type, &self.pool).await
    }

    async fn update_url_content(&self, id: UrlRecordId, update: &UrlContentUpdate) -> Result<()> {
        UrlRecord::update_content(id, update, &self.pool)
            .await
            .with_context(|| format!("Failed to store content for url {}", id))
    }

    async fn insert_redirect(&self, redirect: &NewRedirect) -> Result<Redirect> {
        Redirect::create(redirect, &self.pool)
            .await
            .context("Failed to insert redirect")
    }

    async fn delete_redirects(&self, batch_id: BatchId) -> Result<u64> {
        Redirect::delete_for_batch(batch_id, &self.pool).await
    }

    async fn list_redirects(&self, batch_id: BatchId) -> Result<Vec<RedirectView>> {
        RedirectView::find_by_batch(batch_id, &self.pool).await
    }

    async fn upsert_scraped_page(&self, page: &ScrapedPageInput) -> Result<ScrapedPage> {
        ScrapedPage::upsert(page, &self.pool)
            .await
            .context("Failed to save scraped page")
    }

    async fn list_scraped_pages(&self, batch_id: BatchId) -> Result<Vec<ScrapedPage>> {
        ScrapedPage::find_by_batch(batch_id, &self.pool).await
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
