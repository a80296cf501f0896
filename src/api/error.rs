use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Errors the HTTP surface reports. Downstream detail is logged, never returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("No file provided")]
    NoFile,
    #[error("Unsupported file type")]
    UnsupportedFileType,
    #[error("File too large")]
    PayloadTooLarge,
    #[error("Failed to process file")]
    UploadFailed,
    #[error("No query provided")]
    NoQuery,
    #[error("No documents have been uploaded yet")]
    NoDocuments,
    #[error("Failed to process query")]
    QueryFailed,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NoFile | Self::UnsupportedFileType | Self::NoQuery | Self::NoDocuments => {
                StatusCode::BAD_REQUEST
            }
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UploadFailed | Self::QueryFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
