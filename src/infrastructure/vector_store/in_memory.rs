use async_trait::async_trait;

use crate::domain::{ports::VectorStore, DocumentChunk, DomainError, Embedding, SearchResult};

/// Brute-force cosine-similarity store. Chunks keep their insertion order.
///
/// Contents are fixed at construction; a new upload builds a new store.
pub struct InMemoryVectorStore {
    chunks: Vec<(DocumentChunk, Embedding)>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self { chunks: Vec::new() }
    }

    pub fn from_entries(entries: Vec<(DocumentChunk, Embedding)>) -> Self {
        Self { chunks: entries }
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        let mut results: Vec<SearchResult> = self
            .chunks
            .iter()
            .map(|(chunk, embedding)| SearchResult {
                chunk: chunk.clone(),
                score: query.cosine_similarity(embedding),
            })
            .collect();

        // Stable sort: ties keep insertion order.
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);

        Ok(results)
    }

    async fn list(&self, limit: usize) -> Result<Vec<DocumentChunk>, DomainError> {
        Ok(self
            .chunks
            .iter()
            .take(limit)
            .map(|(c, _)| c.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_search_scores_exact_match() {
        let store = InMemoryVectorStore::from_entries(vec![(
            DocumentChunk::new("test content", 0),
            Embedding::new(vec![1.0, 0.0, 0.0]),
        )]);

        let query = Embedding::new(vec![1.0, 0.0, 0.0]);
        let results = store.search(&query, 1).await.unwrap();

        assert_eq!(results.len(), 1);
        assert!((results[0].score - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_search_orders_by_score_and_truncates() {
        let store = InMemoryVectorStore::from_entries(vec![
            (DocumentChunk::new("far", 0), Embedding::new(vec![0.0, 1.0])),
            (DocumentChunk::new("near", 1), Embedding::new(vec![1.0, 0.1])),
            (DocumentChunk::new("middle", 2), Embedding::new(vec![1.0, 1.0])),
        ]);

        let results = store
            .search(&Embedding::new(vec![1.0, 0.0]), 2)
            .await
            .unwrap();

        let contents: Vec<_> = results.iter().map(|r| r.chunk.content.as_str()).collect();
        assert_eq!(contents, vec!["near", "middle"]);
    }

    #[tokio::test]
    async fn test_empty_store_finds_nothing() {
        let store = InMemoryVectorStore::new();
        let results = store.search(&Embedding::new(vec![1.0]), 4).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let entries = (0..8)
            .map(|i| {
                (
                    DocumentChunk::new(format!("chunk {i}"), i),
                    Embedding::new(vec![1.0]),
                )
            })
            .collect();
        let store = InMemoryVectorStore::from_entries(entries);

        let listed = store.list(5).await.unwrap();
        let indexes: Vec<_> = listed.iter().map(|c| c.chunk_index).collect();
        assert_eq!(indexes, vec![0, 1, 2, 3, 4]);
        assert!(InMemoryVectorStore::new().list(5).await.unwrap().is_empty());
    }
}
