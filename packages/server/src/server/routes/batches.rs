use axum::{extract::Extension, Json};
use serde::Serialize;

use crate::common::BatchId;
use crate::domains::batches::CreateBatchInput;
use crate::server::app::AppState;
use crate::server::error::{ApiError, ApiJson};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBatchResponse {
    pub success: bool,
    pub batch_id: BatchId,
}

/// POST /api/batch
///
/// Validation runs before anything is written, so a rejected request
/// leaves no rows behind.
pub async fn create_batch_handler(
    Extension(state): Extension<AppState>,
    ApiJson(input): ApiJson<CreateBatchInput>,
) -> Result<Json<CreateBatchResponse>, ApiError> {
    let batch = input.validate()?;
    let created = state.pipeline.create_batch(batch).await?;

    Ok(Json(CreateBatchResponse {
        success: true,
        batch_id: created.id,
    }))
}
