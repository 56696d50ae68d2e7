//! Error responses and body/query extractors that report as `{error}`.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::domains::batches::ValidationError;
use crate::pipeline::BatchNotFound;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<BatchNotFound>() {
            Some(not_found) => ApiError::NotFound(not_found.to_string()),
            None => ApiError::Internal(err),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Internal(err) => {
                error!(error = %format!("{:#}", err), "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", err))
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// `Json` whose rejections become 400 `{error}` bodies
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `Query` whose rejections become 400 `{error}` bodies
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_batch_maps_to_not_found() {
        let err: ApiError = anyhow::Error::new(BatchNotFound(crate::common::BatchId::new())).into();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err: ApiError = anyhow::anyhow!("connection reset").into();
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::BadRequest("x".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("db down")).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
