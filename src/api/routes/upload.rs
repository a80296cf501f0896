use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::api::{error::ApiError, state::AppState};
use crate::application::SourceChunk;
use crate::infrastructure::loaders::FileKind;

const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    pub document_count: usize,
    pub file_name: String,
}

#[derive(Debug, Serialize)]
pub struct ListDocumentsResponse {
    pub documents: Vec<SourceChunk>,
}

struct UploadedFile {
    name: String,
    bytes: Vec<u8>,
}

pub async fn upload_document(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart.map_err(|e| {
        tracing::error!(error = %e, "Rejected upload body");
        ApiError::UploadFailed
    })?;

    let file = read_file_field(&mut multipart).await?.ok_or(ApiError::NoFile)?;
    let kind = FileKind::from_file_name(&file.name).ok_or(ApiError::UnsupportedFileType)?;

    let report = state
        .ingest_service
        .ingest(kind, &file.name, file.bytes)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, file_name = %file.name, "Failed to process file");
            ApiError::UploadFailed
        })?;

    Ok(Json(UploadResponse {
        message: "File processed successfully".to_string(),
        document_count: report.chunk_count,
        file_name: report.file_name,
    }))
}

/// Finds the `file` part; parts without a file name do not count as a file.
///
/// A body over the configured limit fails here while streaming, as 413.
async fn read_file_field(multipart: &mut Multipart) -> Result<Option<UploadedFile>, ApiError> {
    let read_error = |e: MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            tracing::warn!(error = %e, "Upload exceeds body limit");
            return ApiError::PayloadTooLarge;
        }
        tracing::error!(error = %e, "Failed to read multipart body");
        ApiError::UploadFailed
    };

    while let Some(field) = multipart.next_field().await.map_err(read_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let Some(name) = field.file_name().map(str::to_string) else {
            return Ok(None);
        };
        let bytes = field.bytes().await.map_err(read_error)?;
        return Ok(Some(UploadedFile {
            name,
            bytes: bytes.to_vec(),
        }));
    }

    Ok(None)
}

pub async fn list_documents(State(state): State<AppState>) -> Json<ListDocumentsResponse> {
    let limit = state.config.config.rag.list_limit;
    let documents = state
        .rag_service
        .list_chunks(limit)
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to list indexed chunks");
            Vec::new()
        });

    Json(ListDocumentsResponse { documents })
}
