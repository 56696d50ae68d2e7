use axum::{extract::Extension, Json};
use serde::{Deserialize, Serialize};

use crate::common::BatchId;
use crate::domains::matching::MatchSummary;
use crate::server::app::AppState;
use crate::server::error::{ApiError, ApiJson};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    pub batch_id: Option<BatchId>,
}

impl BatchRequest {
    fn require_batch_id(&self) -> Result<BatchId, ApiError> {
        self.batch_id
            .ok_or_else(|| ApiError::BadRequest("batchId is required".to_string()))
    }
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub success: bool,
    #[serde(flatten)]
    pub summary: MatchSummary,
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub success: bool,
    pub cancelled: bool,
}

/// POST /api/match
pub async fn match_handler(
    Extension(state): Extension<AppState>,
    ApiJson(request): ApiJson<BatchRequest>,
) -> Result<Json<MatchResponse>, ApiError> {
    let batch_id = request.require_batch_id()?;
    let summary = state.pipeline.match_batch(batch_id).await?;

    Ok(Json(MatchResponse {
        success: true,
        summary,
    }))
}

/// POST /api/cancel - stops running scrape and match jobs of a batch
pub async fn cancel_handler(
    Extension(state): Extension<AppState>,
    ApiJson(request): ApiJson<BatchRequest>,
) -> Result<Json<CancelResponse>, ApiError> {
    let batch_id = request.require_batch_id()?;

    Ok(Json(CancelResponse {
        success: true,
        cancelled: state.pipeline.cancel(batch_id),
    }))
}
