use axum::{extract::Extension, Json};
use serde::{Deserialize, Serialize};

use crate::common::BatchId;
use crate::domains::batches::{UrlRecord, UrlType};
use crate::server::app::AppState;
use crate::server::error::{ApiError, ApiQuery};

#[derive(Debug, Deserialize)]
pub struct UrlsQuery {
    #[serde(rename = "batchId")]
    pub batch_id: Option<BatchId>,
    #[serde(rename = "type")]
    pub url_type: Option<UrlType>,
}

#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: Vec<T>,
}

/// GET /api/urls?batchId=..&type=old|new
pub async fn list_urls_handler(
    Extension(state): Extension<AppState>,
    ApiQuery(query): ApiQuery<UrlsQuery>,
) -> Result<Json<DataResponse<UrlRecord>>, ApiError> {
    let batch_id = query
        .batch_id
        .ok_or_else(|| ApiError::BadRequest("batchId is required".to_string()))?;

    let data = state.pipeline.list_urls(batch_id, query.url_type).await?;
    Ok(Json(DataResponse { data }))
}
