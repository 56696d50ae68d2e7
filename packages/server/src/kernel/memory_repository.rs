//! In-memory UrlRepository for tests and database-less CLI runs.
//!
//! Mirrors the Postgres constraints that matter to callers: foreign keys to
//! the batch, unique `(batch, type, order)` and `(batch, url)` keys, and the
//! same result orderings. Data is lost when the value is dropped.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::UrlRepository;
use crate::common::{BatchId, RedirectId, ScrapedPageId, UrlRecordId};
use crate::domains::batches::{Batch, NewUrlRecord, UrlContentUpdate, UrlRecord, UrlType};
use crate::domains::redirects::{NewRedirect, Redirect, RedirectView};
use crate::domains::scraped_pages::{ScrapedPage, ScrapedPageInput};

#[derive(Default)]
struct State {
    batches: HashMap<BatchId, Batch>,
    urls: Vec<UrlRecord>,
    redirects: Vec<Redirect>,
    scraped_pages: Vec<ScrapedPage>,
}

#[derive(Default)]
pub struct MemoryUrlRepository {
    state: RwLock<State>,
}

impl MemoryUrlRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }

    /// Number of stored redirects across all batches
    pub fn redirect_count(&self) -> usize {
        self.read().map(|s| s.redirects.len()).unwrap_or_default()
    }

    /// Number of stored URL rows across all batches
    pub fn url_count(&self) -> usize {
        self.read().map(|s| s.urls.len()).unwrap_or_default()
    }
}

fn type_rank(url_type: UrlType) -> u8 {
    match url_type {
        UrlType::Old => 0,
        UrlType::New => 1,
    }
}

#[async_trait]
impl UrlRepository for MemoryUrlRepository {
    async fn create_batch(&self, name: &str) -> Result<Batch> {
        let batch = Batch {
            id: BatchId::new(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        self.write()?.batches.insert(batch.id, batch.clone());
        Ok(batch)
    }

    async fn find_batch(&self, id: BatchId) -> Result<Option<Batch>> {
        Ok(self.read()?.batches.get(&id).cloned())
    }

    async fn insert_urls(&self, batch_id: BatchId, urls: &[NewUrlRecord]) -> Result<()> {
        let mut state = self.write()?;
        if !state.batches.contains_key(&batch_id) {
            bail!("batch {} does not exist", batch_id);
        }

        let mut taken: HashSet<(UrlType, i32)> = state
            .urls
            .iter()
            .filter(|u| u.batch_id == batch_id)
            .map(|u| (u.url_type, u.order))
            .collect();
        for url in urls {
            if !taken.insert((url.url_type, url.order)) {
                bail!(
                    "duplicate {} url at position {} in batch {}",
                    url.url_type,
                    url.order,
                    batch_id
                );
            }
        }

        let now = Utc::now();
        state.urls.extend(urls.iter().map(|url| UrlRecord {
            id: UrlRecordId::new(),
            batch_id,
            url: url.url.clone(),
            url_type: url.url_type,
            order: url.order,
            title: None,
            main_content: None,
            meta_description: None,
            h1_heading: None,
            status_code: None,
            scrape_error: None,
            scraped_at: None,
            created_at: now,
        }));
        Ok(())
    }

    async fn list_urls(
        &self,
        batch_id: BatchId,
        url_type: Option<UrlType>,
    ) -> Result<Vec<UrlRecord>> {
        let mut urls: Vec<UrlRecord> = self
            .read()?
            .urls
            .iter()
            .filter(|u| u.batch_id == batch_id)
            .filter(|u| url_type.map_or(true, |t| u.url_type == t))
            .cloned()
            .collect();
        urls.sort_by_key(|u| (type_rank(u.url_type), u.order));
        Ok(urls)
    }

    async fn update_url_content(&self, id: UrlRecordId, update: &UrlContentUpdate) -> Result<()> {
        let mut state = self.write()?;
        // Like an UPDATE matching no rows, an unknown id is not an error
        if let Some(record) = state.urls.iter_mut().find(|u| u.id == id) {
            record.title = update.title.clone();
            record.main_content = update.main_content.clone();
            record.meta_description = update.meta_description.clone();
            record.h1_heading = update.h1_heading.clone();
            record.status_code = update.status_code;
            record.scrape_error = update.scrape_error.clone();
            record.scraped_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn insert_redirect(&self, redirect: &NewRedirect) -> Result<Redirect> {
        let mut state = self.write()?;
        if !state.batches.contains_key(&redirect.batch_id) {
            bail!("batch {} does not exist", redirect.batch_id);
        }
        for id in [redirect.old_url_id, redirect.new_url_id] {
            if !state.urls.iter().any(|u| u.id == id) {
                bail!("url {} does not exist", id);
            }
        }
        if !(0.0..=1.0).contains(&redirect.confidence_score) {
            bail!("confidence_score {} out of range", redirect.confidence_score);
        }

        let row = Redirect {
            id: RedirectId::new(),
            batch_id: redirect.batch_id,
            old_url_id: redirect.old_url_id,
            new_url_id: redirect.new_url_id,
            confidence_score: redirect.confidence_score,
            match_type: redirect.match_type,
            match_reasoning: redirect.match_reasoning.clone(),
            created_at: Utc::now(),
        };
        state.redirects.push(row.clone());
        Ok(row)
    }

    async fn delete_redirects(&self, batch_id: BatchId) -> Result<u64> {
        let mut state = self.write()?;
        let before = state.redirects.len();
        state.redirects.retain(|r| r.batch_id != batch_id);
        Ok((before - state.redirects.len()) as u64)
    }

    async fn list_redirects(&self, batch_id: BatchId) -> Result<Vec<RedirectView>> {
        let state = self.read()?;
        let url_of = |id: UrlRecordId| {
            state
                .urls
                .iter()
                .find(|u| u.id == id)
                .map(|u| u.url.clone())
        };

        // Insertion order is creation order
        Ok(state
            .redirects
            .iter()
            .filter(|r| r.batch_id == batch_id)
            .filter_map(|r| {
                Some(RedirectView {
                    id: r.id,
                    batch_id: r.batch_id,
                    old_url_id: r.old_url_id,
                    new_url_id: r.new_url_id,
                    old_url: url_of(r.old_url_id)?,
                    new_url: url_of(r.new_url_id)?,
                    confidence_score: r.confidence_score,
                    match_type: r.match_type,
                    match_reasoning: r.match_reasoning.clone(),
                    created_at: r.created_at,
                })
            })
            .collect())
    }

    async fn upsert_scraped_page(&self, page: &ScrapedPageInput) -> Result<ScrapedPage> {
        let mut state = self.write()?;
        if !state.batches.contains_key(&page.batch_id) {
            bail!("batch {} does not exist", page.batch_id);
        }

        let existing = state
            .scraped_pages
            .iter_mut()
            .find(|p| p.batch_id == page.batch_id && p.url == page.url);

        let row = match existing {
            Some(row) => {
                row.site_type = page.site_type.clone();
                row.meta_title = page.meta_title.clone();
                row.meta_description = page.meta_description.clone();
                row.content_text = page.content_text.clone();
                row.scraped_at = page.scraped_at;
                row.scraping_status = page.scraping_status.clone();
                row.clone()
            }
            None => {
                let row = ScrapedPage {
                    id: ScrapedPageId::new(),
                    batch_id: page.batch_id,
                    url: page.url.clone(),
                    site_type: page.site_type.clone(),
                    meta_title: page.meta_title.clone(),
                    meta_description: page.meta_description.clone(),
                    content_text: page.content_text.clone(),
                    scraped_at: page.scraped_at,
                    scraping_status: page.scraping_status.clone(),
                };
                state.scraped_pages.push(row.clone());
                row
            }
        };
        Ok(row)
    }

    async fn list_scraped_pages(&self, batch_id: BatchId) -> Result<Vec<ScrapedPage>> {
        let mut pages: Vec<ScrapedPage> = self
            .read()?
            .scraped_pages
            .iter()
            .filter(|p| p.batch_id == batch_id)
            .cloned()
            .collect();
        // NULL site types sort last, as in Postgres
        pages.sort_by(|a, b| {
            (a.site_type.is_none(), &a.site_type, &a.url).cmp(&(
                b.site_type.is_none(),
                &b.site_type,
                &b.url,
            ))
        });
        Ok(pages)
    }

    async fn ping(&self) -> Result<()> {
        self.read().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_urls_require_existing_batch() {
        let repo = MemoryUrlRepository::new();
        let urls = NewUrlRecord::from_lists(&["https://a.com/x".into()], &[]);

        assert!(repo.insert_urls(BatchId::new(), &urls).await.is_err());
    }

    #[tokio::test]
    async fn test_duplicate_positions_are_rejected_atomically() {
        let repo = MemoryUrlRepository::new();
        let batch = repo.create_batch("b").await.unwrap();
        let urls = NewUrlRecord::from_lists(&["https://a.com/x".into()], &[]);

        repo.insert_urls(batch.id, &urls).await.unwrap();
        assert!(repo.insert_urls(batch.id, &urls).await.is_err());
        assert_eq!(repo.url_count(), 1);
    }

    #[tokio::test]
    async fn test_scraped_pages_upsert_and_order() {
        let repo = MemoryUrlRepository::new();
        let batch = repo.create_batch("b").await.unwrap();
        let page = |url: &str, site_type: Option<&str>, title: &str| ScrapedPageInput {
            batch_id: batch.id,
            url: url.to_string(),
            site_type: site_type.map(str::to_string),
            meta_title: Some(title.to_string()),
            meta_description: None,
            content_text: None,
            scraped_at: Utc::now(),
            scraping_status: Some("ok".to_string()),
        };

        repo.upsert_scraped_page(&page("https://b.com/2", Some("old"), "first")).await.unwrap();
        repo.upsert_scraped_page(&page("https://b.com/1", None, "x")).await.unwrap();
        repo.upsert_scraped_page(&page("https://a.com/1", Some("new"), "y")).await.unwrap();
        repo.upsert_scraped_page(&page("https://b.com/2", Some("old"), "second")).await.unwrap();

        let pages = repo.list_scraped_pages(batch.id).await.unwrap();
        let urls: Vec<&str> = pages.iter().map(|p| p.url.as_str()).collect();

        assert_eq!(urls, vec!["https://a.com/1", "https://b.com/2", "https://b.com/1"]);
        assert_eq!(pages[1].meta_title.as_deref(), Some("second"));
    }
}
