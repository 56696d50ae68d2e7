use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::BatchId;

/// A named redirect-mapping job
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Batch {
    pub id: BatchId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Batch {
    pub async fn create(name: &str, pool: &PgPool) -> Result<Self> {
        let batch = sqlx::query_as::<_, Self>(
            "INSERT INTO batches (id, name) VALUES ($1, $2) RETURNING *",
        )
        .bind(BatchId::new())
        .bind(name)
        .fetch_one(pool)
        .await?;
        Ok(batch)
    }

    pub async fn find_by_id_optional(id: BatchId, pool: &PgPool) -> Result<Option<Self>> {
        let batch = sqlx::query_as::<_, Self>("SELECT * FROM batches WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(batch)
    }
}
