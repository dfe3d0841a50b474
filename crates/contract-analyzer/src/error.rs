use std::time::Duration;

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, warn};

use contract_common::api::ErrorResponse;
use contract_common::error::CommonError;

/// Startup failures.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Common(#[from] CommonError),

    #[error("config error: {0}")]
    Config(String),
}

/// Failures at the request boundary.
///
/// Each variant is logged with its cause when converted into a response; the caller
/// only ever sees the generic message in [`ErrorResponse`].
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("no file uploaded")]
    MissingFile,

    #[error("failed to read upload: {0}")]
    Upload(#[from] MultipartError),

    #[error("rate limit exceeded, retry in ~{}ms", .retry_after.as_millis())]
    RateLimited { retry_after: Duration },

    #[error("text extraction failed: {0}")]
    Extraction(CommonError),

    #[error("internal failure: {0}")]
    Internal(String),
}

impl From<CommonError> for ApiError {
    fn from(err: CommonError) -> Self {
        match err {
            CommonError::Worker(detail) => ApiError::Internal(detail),
            other => ApiError::Extraction(other),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFile => StatusCode::BAD_REQUEST,
            ApiError::Upload(e) => e.status(),
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Extraction(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match self {
            ApiError::MissingFile => "No file uploaded".to_string(),
            ApiError::Upload(_) => "Failed to read upload".to_string(),
            ApiError::RateLimited { retry_after } => {
                format!("Too many requests, retry in ~{}ms", retry_after.as_millis())
            }
            ApiError::Extraction(_) | ApiError::Internal(_) => "Failed to process PDF".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Internal(_) => error!(error = %self, "analyze request failed"),
            ApiError::Extraction(_) => warn!(error = %self, "analyze request failed"),
            _ => warn!(status = status.as_u16(), error = %self, "analyze request rejected"),
        }
        let body = ErrorResponse {
            error: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_failures_are_internal() {
        let err = ApiError::from(CommonError::Worker("join error".to_string()));
        assert!(matches!(err, ApiError::Internal(_)));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn pdf_failures_are_extraction_errors() {
        let err = ApiError::from(CommonError::PdfEncrypted);
        assert!(matches!(err, ApiError::Extraction(_)));
        assert_eq!(err.public_message(), "Failed to process PDF");
    }

    #[test]
    fn client_errors() {
        assert_eq!(ApiError::MissingFile.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::MissingFile.public_message(), "No file uploaded");

        let retry_after = Duration::from_millis(250);
        let limited = ApiError::RateLimited { retry_after };
        assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(limited.public_message(), "Too many requests, retry in ~250ms");
    }
}
