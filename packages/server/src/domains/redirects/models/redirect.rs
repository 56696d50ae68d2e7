use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{BatchId, RedirectId, UrlRecordId};

/// How a redirect's target was chosen
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    /// Identical URL on both sides
    Exact,
    /// Picked by the language model
    Ai,
    /// Entered by hand
    Manual,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Exact => "exact",
            MatchType::Ai => "ai",
            MatchType::Manual => "manual",
        }
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MatchType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "exact" => Ok(MatchType::Exact),
            "ai" => Ok(MatchType::Ai),
            "manual" => Ok(MatchType::Manual),
            _ => Err(anyhow::anyhow!("Invalid match type: {}", s)),
        }
    }
}

impl TryFrom<String> for MatchType {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Redirect row as stored
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Redirect {
    pub id: RedirectId,
    pub batch_id: BatchId,
    pub old_url_id: UrlRecordId,
    pub new_url_id: UrlRecordId,
    pub confidence_score: f64,
    #[sqlx(try_from = "String")]
    pub match_type: MatchType,
    /// Raw model answer the match was read from
    pub match_reasoning: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewRedirect {
    pub batch_id: BatchId,
    pub old_url_id: UrlRecordId,
    pub new_url_id: UrlRecordId,
    pub confidence_score: f64,
    pub match_type: MatchType,
    pub match_reasoning: Option<String>,
}

/// Redirect joined with the URL strings of both ends
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RedirectView {
    pub id: RedirectId,
    pub batch_id: BatchId,
    pub old_url_id: UrlRecordId,
    pub new_url_id: UrlRecordId,
    pub old_url: String,
    pub new_url: String,
    pub confidence_score: f64,
    #[sqlx(try_from = "String")]
    pub match_type: MatchType,
    pub match_reasoning: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Redirect {
    pub async fn create(input: &NewRedirect, pool: &PgPool) -> Result<Self> {
        let redirect = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO redirects
                (id, batch_id, old_url_id, new_url_id, confidence_score, match_type, match_reasoning)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(RedirectId::new())
        .bind(input.batch_id)
        .bind(input.old_url_id)
        .bind(input.new_url_id)
        .bind(input.confidence_score)
        .bind(input.match_type.as_str())
        .bind(&input.match_reasoning)
        .fetch_one(pool)
        .await?;
        Ok(redirect)
    }

    pub async fn delete_for_batch(batch_id: BatchId, pool: &PgPool) -> Result<u64> {
        let result = sqlx::query("DELETE FROM redirects WHERE batch_id = $1")
            .bind(batch_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

impl RedirectView {
    /// All redirects of a batch in the order they were created.
    pub async fn find_by_batch(batch_id: BatchId, pool: &PgPool) -> Result<Vec<Self>> {
        let views = sqlx::query_as::<_, Self>(
            r#"
            SELECT r.id, r.batch_id, r.old_url_id, r.new_url_id,
                   o.url AS old_url, n.url AS new_url,
                   r.confidence_score, r.match_type, r.match_reasoning, r.created_at
            FROM redirects r
            JOIN urls o ON o.id = r.old_url_id
            JOIN urls n ON n.id = r.new_url_id
            WHERE r.batch_id = $1
            ORDER BY r.created_at, r.id
            "#,
        )
        .bind(batch_id)
        .fetch_all(pool)
        .await?;
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_type_text_forms_agree() {
        for match_type in [MatchType::Exact, MatchType::Ai, MatchType::Manual] {
            let json = serde_json::to_value(match_type).unwrap();
            assert_eq!(json, match_type.as_str());
            assert_eq!(match_type.to_string().parse::<MatchType>().unwrap(), match_type);
        }
    }

    #[test]
    fn test_unknown_match_type_is_rejected() {
        assert!("fuzzy".parse::<MatchType>().is_err());
        assert!(MatchType::try_from("AI".to_string()).is_err());
        assert!(serde_json::from_str::<MatchType>("\"guess\"").is_err());
    }
}
