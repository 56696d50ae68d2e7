use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::common::{BatchId, UrlRecordId};

/// Rows per INSERT statement; keeps bind parameters well under the Postgres limit
const INSERT_CHUNK: usize = 1000;

/// Which side of the migration a URL belongs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum UrlType {
    Old,
    New,
}

impl UrlType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrlType::Old => "old",
            UrlType::New => "new",
        }
    }
}

impl std::fmt::Display for UrlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid url type: {0}")]
pub struct UnknownUrlType(pub String);

impl std::str::FromStr for UrlType {
    type Err = UnknownUrlType;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "old" => Ok(UrlType::Old),
            "new" => Ok(UrlType::New),
            other => Err(UnknownUrlType(other.to_string())),
        }
    }
}

impl TryFrom<String> for UrlType {
    type Error = UnknownUrlType;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

/// One URL of a batch together with whatever extraction has produced so far
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UrlRecord {
    pub id: UrlRecordId,
    pub batch_id: BatchId,
    pub url: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type", try_from = "String")]
    pub url_type: UrlType,
    /// Zero-based position within the submitted list
    pub order: i32,

    // Extracted content
    pub title: Option<String>,
    pub main_content: Option<String>,
    pub meta_description: Option<String>,
    pub h1_heading: Option<String>,
    /// HTTP status of the last fetch; 0 when the fetch itself failed
    pub status_code: Option<i32>,
    pub scrape_error: Option<String>,
    pub scraped_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

/// A URL about to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUrlRecord {
    pub url: String,
    pub url_type: UrlType,
    pub order: i32,
}

impl NewUrlRecord {
    /// Old URLs first, then new ones, each numbered by list position.
    pub fn from_lists(old_urls: &[String], new_urls: &[String]) -> Vec<Self> {
        let numbered = |urls: &[String], url_type: UrlType| {
            urls.iter()
                .enumerate()
                .map(move |(i, url)| Self {
                    url: url.clone(),
                    url_type,
                    order: i as i32,
                })
                .collect::<Vec<_>>()
        };

        let mut records = numbered(old_urls, UrlType::Old);
        records.extend(numbered(new_urls, UrlType::New));
        records
    }
}

/// Result of one extraction, written back onto a URL row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UrlContentUpdate {
    pub title: Option<String>,
    pub main_content: Option<String>,
    pub meta_description: Option<String>,
    pub h1_heading: Option<String>,
    pub status_code: Option<i32>,
    pub scrape_error: Option<String>,
}

impl UrlRecord {
    /// Insert the whole URL set of a batch; either every row lands or none does.
    pub async fn insert_many(
        batch_id: BatchId,
        urls: &[NewUrlRecord],
        pool: &PgPool,
    ) -> Result<()> {
        let mut tx = pool.begin().await?;

        for chunk in urls.chunks(INSERT_CHUNK) {
            let mut builder: QueryBuilder<Postgres> =
                QueryBuilder::new(r#"INSERT INTO urls (id, batch_id, url, type, "order") "#);
            builder.push_values(chunk, |mut row, url| {
                row.push_bind(UrlRecordId::new())
                    .push_bind(batch_id)
                    .push_bind(url.url.clone())
                    .push_bind(url.url_type.as_str())
                    .push_bind(url.order);
            });
            builder.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// URLs of a batch, old before new, each side in submission order.
    pub async fn find_by_batch(
        batch_id: BatchId,
        url_type: Option<UrlType>,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        let records = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM urls
            WHERE batch_id = $1 AND ($2::text IS NULL OR type = $2)
            ORDER BY CASE type WHEN 'old' THEN 0 ELSE 1 END, "order"
            "#,
        )
        .bind(batch_id)
        .bind(url_type.map(|t| t.as_str()))
        .fetch_all(pool)
        .await?;
        Ok(records)
    }

    /// Overwrite the extracted fields and stamp `scraped_at`.
    pub async fn update_content(
        id: UrlRecordId,
        update: &UrlContentUpdate,
        pool: &PgPool,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE urls
            SET title = $2,
                main_content = $3,
                meta_description = $4,
                h1_heading = $5,
                status_code = $6,
                scrape_error = $7,
                scraped_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&update.title)
        .bind(&update.main_content)
        .bind(&update.meta_description)
        .bind(&update.h1_heading)
        .bind(update.status_code)
        .bind(&update.scrape_error)
        .execute(pool)
        .await?;
        Ok(())
    }
}
