use axum::{
    extract::Extension,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::common::BatchId;
use crate::domains::extraction::{ScrapeOptions, ScrapeSummary};
use crate::server::app::AppState;
use crate::server::error::{ApiError, ApiJson};

/// Either a single ad-hoc URL or a whole batch
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ScrapeRequest {
    #[serde(rename_all = "camelCase")]
    Batch {
        batch_id: BatchId,
        max_rows: Option<usize>,
        #[serde(default)]
        resume: bool,
    },
    Single {
        url: String,
    },
}

#[derive(Debug, Serialize)]
pub struct ScrapeBatchResponse {
    pub success: bool,
    #[serde(flatten)]
    pub summary: ScrapeSummary,
}

/// POST /api/scrape
pub async fn scrape_handler(
    Extension(state): Extension<AppState>,
    ApiJson(request): ApiJson<ScrapeRequest>,
) -> Result<Response, ApiError> {
    match request {
        ScrapeRequest::Single { url } => {
            let url = url.trim();
            if url.is_empty() {
                return Err(ApiError::BadRequest("url is required".to_string()));
            }
            let result = state.pipeline.scrape_url(url).await;
            Ok(Json(result).into_response())
        }
        ScrapeRequest::Batch {
            batch_id,
            max_rows,
            resume,
        } => {
            let summary = state
                .pipeline
                .scrape_batch(batch_id, ScrapeOptions { max_rows, resume })
                .await?;
            Ok(Json(ScrapeBatchResponse {
                success: true,
                summary,
            })
            .into_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shapes() {
        let single: ScrapeRequest =
            serde_json::from_str(r#"{"url": "https://example.com"}"#).unwrap();
        assert!(matches!(single, ScrapeRequest::Single { .. }));

        let id = BatchId::new();
        let batch: ScrapeRequest = serde_json::from_str(&format!(
            r#"{{"batchId": "{}", "maxRows": 5}}"#,
            id
        ))
        .unwrap();
        match batch {
            ScrapeRequest::Batch {
                batch_id,
                max_rows,
                resume,
            } => {
                assert_eq!(batch_id, id);
                assert_eq!(max_rows, Some(5));
                assert!(!resume);
            }
            other => panic!("expected batch request, got {:?}", other),
        }

        assert!(serde_json::from_str::<ScrapeRequest>("{}").is_err());
    }
}
