use axum::{
    extract::Extension,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::common::BatchId;
use crate::domains::redirects::{ExportFormat, RedirectView};
use crate::server::app::AppState;
use crate::server::error::{ApiError, ApiQuery};
use crate::server::routes::urls::DataResponse;

#[derive(Debug, Deserialize)]
pub struct RedirectsQuery {
    #[serde(rename = "batchId")]
    pub batch_id: Option<BatchId>,
    pub format: Option<String>,
}

impl RedirectsQuery {
    fn require_batch_id(&self) -> Result<BatchId, ApiError> {
        self.batch_id
            .ok_or_else(|| ApiError::BadRequest("batchId is required".to_string()))
    }
}

/// GET /api/redirects?batchId=..
pub async fn list_redirects_handler(
    Extension(state): Extension<AppState>,
    ApiQuery(query): ApiQuery<RedirectsQuery>,
) -> Result<Json<DataResponse<RedirectView>>, ApiError> {
    let batch_id = query.require_batch_id()?;
    let data = state.pipeline.list_redirects(batch_id).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/redirects/export?batchId=..&format=htaccess|nginx|csv
pub async fn export_redirects_handler(
    Extension(state): Extension<AppState>,
    ApiQuery(query): ApiQuery<RedirectsQuery>,
) -> Result<Response, ApiError> {
    let batch_id = query.require_batch_id()?;
    let format: ExportFormat = query
        .format
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("format is required".to_string()))?
        .parse()
        .map_err(|e: anyhow::Error| ApiError::BadRequest(e.to_string()))?;

    let body = state.pipeline.export(batch_id, format).await?;

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", format.file_name()),
            ),
        ],
        body,
    )
        .into_response())
}
