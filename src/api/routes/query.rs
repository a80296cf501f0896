use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::{error::ApiError, state::AppState};
use crate::application::SourceChunk;
use crate::domain::SourceDocument;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub documents: Vec<SourceDocument>,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub answer: String,
    pub sources: Vec<SourceChunk>,
}

pub async fn query_documents(
    State(state): State<AppState>,
    request: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let Json(request) = request.map_err(|e| {
        tracing::error!(error = %e, "Rejected query body");
        ApiError::QueryFailed
    })?;

    let query = request
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or(ApiError::NoQuery)?;

    let rag = &state.rag_service;
    let index = rag
        .resolve_index(&request.documents)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to index inline documents");
            ApiError::QueryFailed
        })?
        .ok_or(ApiError::NoDocuments)?;

    let answer = rag.answer(&index, query).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to answer query");
        ApiError::QueryFailed
    })?;

    Ok(Json(QueryResponse {
        answer: answer.text,
        sources: answer.sources,
    }))
}
