use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{BatchId, ScrapedPageId};

/// Externally produced scrape result, unique per (batch, url)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ScrapedPage {
    pub id: ScrapedPageId,
    pub batch_id: BatchId,
    pub url: String,
    pub site_type: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub content_text: Option<String>,
    pub scraped_at: DateTime<Utc>,
    pub scraping_status: Option<String>,
}

/// Request body of the save endpoint; presence of `batch_id` and `url`
/// is checked by [`SaveScrapedPageInput::validate`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaveScrapedPageInput {
    pub batch_id: Option<BatchId>,
    pub url: Option<String>,
    pub site_type: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub content_text: Option<String>,
    pub scraped_at: Option<DateTime<Utc>>,
    pub scraping_status: Option<String>,
}

/// Validated upsert payload
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapedPageInput {
    pub batch_id: BatchId,
    pub url: String,
    pub site_type: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub content_text: Option<String>,
    pub scraped_at: DateTime<Utc>,
    pub scraping_status: Option<String>,
}

impl SaveScrapedPageInput {
    /// `None` when `batch_id` or `url` is missing or blank.
    pub fn validate(self) -> Option<ScrapedPageInput> {
        let batch_id = self.batch_id?;
        let url = self.url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())?;

        Some(ScrapedPageInput {
            batch_id,
            url,
            site_type: self.site_type,
            meta_title: self.meta_title,
            meta_description: self.meta_description,
            content_text: self.content_text,
            scraped_at: self.scraped_at.unwrap_or_else(Utc::now),
            scraping_status: self.scraping_status,
        })
    }
}

impl ScrapedPage {
    /// Insert or overwrite the row keyed by (batch_id, url).
    pub async fn upsert(input: &ScrapedPageInput, pool: &PgPool) -> Result<Self> {
        let page = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO scraped_pages
                (id, batch_id, url, site_type, meta_title, meta_description,
                 content_text, scraped_at, scraping_status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (batch_id, url) DO UPDATE SET
                site_type = EXCLUDED.site_type,
                meta_title = EXCLUDED.meta_title,
                meta_description = EXCLUDED.meta_description,
                content_text = EXCLUDED.content_text,
                scraped_at = EXCLUDED.scraped_at,
                scraping_status = EXCLUDED.scraping_status
            RETURNING *
            "#,
        )
        .bind(ScrapedPageId::new())
        .bind(input.batch_id)
        .bind(&input.url)
        .bind(&input.site_type)
        .bind(&input.meta_title)
        .bind(&input.meta_description)
        .bind(&input.content_text)
        .bind(input.scraped_at)
        .bind(&input.scraping_status)
        .fetch_one(pool)
        .await?;
        Ok(page)
    }

    /// Pages of a batch ordered by site type, then URL.
    pub async fn find_by_batch(batch_id: BatchId, pool: &PgPool) -> Result<Vec<Self>> {
        let pages = sqlx::query_as::<_, Self>(
            "SELECT * FROM scraped_pages WHERE batch_id = $1 ORDER BY site_type, url",
        )
        .bind(batch_id)
        .fetch_all(pool)
        .await?;
        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requires_batch_and_url() {
        assert!(SaveScrapedPageInput::default().validate().is_none());
        assert!(SaveScrapedPageInput {
            batch_id: Some(BatchId::new()),
            url: Some("   ".into()),
            ..Default::default()
        }
        .validate()
        .is_none());
    }

    #[test]
    fn test_validate_defaults_scraped_at() {
        let page = SaveScrapedPageInput {
            batch_id: Some(BatchId::new()),
            url: Some("https://a.com/x".into()),
            site_type: Some("old".into()),
            ..Default::default()
        }
        .validate()
        .unwrap();

        assert_eq!(page.url, "https://a.com/x");
        assert!(page.scraped_at <= Utc::now());
    }
}
