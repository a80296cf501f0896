use crate::domain::{errors::DomainError, DocumentChunk, Embedding, SearchResult};
use async_trait::async_trait;

/// Read side of a built index. Stores are filled once, then only queried.
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError>;
    /// First `limit` chunks in insertion order.
    async fn list(&self, limit: usize) -> Result<Vec<DocumentChunk>, DomainError>;
}
