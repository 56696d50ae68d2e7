use axum::{extract::Extension, Json};
use serde::{Deserialize, Serialize};

use crate::common::BatchId;
use crate::domains::scraped_pages::{SaveScrapedPageInput, ScrapedPage};
use crate::server::app::AppState;
use crate::server::error::{ApiError, ApiJson, ApiQuery};

#[derive(Debug, Deserialize)]
pub struct ScrapedPagesQuery {
    pub batch_id: Option<BatchId>,
}

#[derive(Debug, Serialize)]
pub struct ScrapedPagesResponse {
    pub success: bool,
    pub data: Vec<ScrapedPage>,
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub success: bool,
}

/// GET /api/scrape/by-batch?batch_id=..
pub async fn list_scraped_pages_handler(
    Extension(state): Extension<AppState>,
    ApiQuery(query): ApiQuery<ScrapedPagesQuery>,
) -> Result<Json<ScrapedPagesResponse>, ApiError> {
    let batch_id = query
        .batch_id
        .ok_or_else(|| ApiError::BadRequest("batch_id is required".to_string()))?;

    let data = state.pipeline.list_scraped_pages(batch_id).await?;
    Ok(Json(ScrapedPagesResponse {
        success: true,
        data,
    }))
}

/// POST /api/scrape/save - upsert keyed on (batch_id, url)
pub async fn save_scraped_page_handler(
    Extension(state): Extension<AppState>,
    ApiJson(input): ApiJson<SaveScrapedPageInput>,
) -> Result<Json<SaveResponse>, ApiError> {
    let page = input
        .validate()
        .ok_or_else(|| ApiError::BadRequest("batch_id and url are required".to_string()))?;

    state.pipeline.save_scraped_page(page).await?;
    Ok(Json(SaveResponse { success: true }))
}
