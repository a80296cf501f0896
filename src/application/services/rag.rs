use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

use crate::application::index::{IndexHandle, IndexOrigin, VectorIndex};
use crate::domain::{
    ports::{EmbeddingService, LlmService},
    DocumentChunk, DomainError, Metadata, SearchResult, SourceDocument,
};
use crate::infrastructure::{config::QaPrompts, InMemoryVectorStore};

/// A chunk as reported back to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceChunk {
    pub content: String,
    pub metadata: Metadata,
}

impl From<DocumentChunk> for SourceChunk {
    fn from(chunk: DocumentChunk) -> Self {
        Self {
            content: chunk.content,
            metadata: chunk.metadata,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    /// Chunks supplied to the model, in rank order.
    pub sources: Vec<SourceChunk>,
}

#[derive(Debug, Clone)]
pub struct RetrievalSettings {
    pub top_k: usize,
    pub max_context_chars: Option<usize>,
}

pub struct RagService {
    embedding: Arc<dyn EmbeddingService>,
    llm: Arc<dyn LlmService>,
    index: Arc<IndexHandle>,
    prompts: QaPrompts,
    settings: RetrievalSettings,
}

impl RagService {
    pub fn new(
        embedding: Arc<dyn EmbeddingService>,
        llm: Arc<dyn LlmService>,
        index: Arc<IndexHandle>,
        prompts: QaPrompts,
        settings: RetrievalSettings,
    ) -> Self {
        Self {
            embedding,
            llm,
            index,
            prompts,
            settings,
        }
    }

    pub fn index(&self) -> &Arc<IndexHandle> {
        &self.index
    }

    /// Embeds `chunks` and wraps them in an index. Nothing is published here.
    #[instrument(skip(self, chunks), fields(count = chunks.len()))]
    pub async fn build_index(
        &self,
        chunks: Vec<DocumentChunk>,
        origin: IndexOrigin,
    ) -> Result<VectorIndex, DomainError> {
        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let embeddings = self.embedding.embed_batch(&texts).await?;

        if embeddings.len() != chunks.len() {
            return Err(DomainError::internal(format!(
                "expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let expected = self.embedding.dimension();
        if let Some(actual) = embeddings
            .iter()
            .map(|e| e.dimension())
            .find(|d| *d != expected)
        {
            tracing::warn!(expected, actual, "embedding dimension differs from configuration");
        }

        let chunk_count = chunks.len();
        let store = InMemoryVectorStore::from_entries(chunks.into_iter().zip(embeddings).collect());
        Ok(VectorIndex::new(Arc::new(store), origin, chunk_count))
    }

    /// The live index, or one built from `documents` when there is none yet.
    ///
    /// Returns `None` when no index exists and `documents` is empty.
    pub async fn resolve_index(
        &self,
        documents: &[SourceDocument],
    ) -> Result<Option<Arc<VectorIndex>>, DomainError> {
        if let Some(index) = self.index.current().await {
            return Ok(Some(index));
        }
        if documents.is_empty() {
            return Ok(None);
        }

        let index = self
            .index
            .get_or_build_with(|| {
                self.build_index(
                    inline_chunks(documents),
                    IndexOrigin::Inline {
                        documents: documents.len(),
                    },
                )
            })
            .await?;
        Ok(Some(index))
    }

    #[instrument(skip(self, index))]
    pub async fn retrieve(
        &self,
        index: &VectorIndex,
        query: &str,
    ) -> Result<Vec<SearchResult>, DomainError> {
        let embedding = self.embedding.embed(query).await?;
        index.store().search(&embedding, self.settings.top_k).await
    }

    /// Retrieves context for `query` from `index` and asks the model.
    #[instrument(skip(self, index), fields(chunk_count = index.chunk_count()))]
    pub async fn answer(&self, index: &VectorIndex, query: &str) -> Result<Answer, DomainError> {
        let results = self.retrieve(index, query).await?;
        let context_chunks = fit_to_budget(results, self.settings.max_context_chars);

        let context = context_chunks
            .iter()
            .map(|c| c.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let prompt = self.prompts.render(&context, query);

        let text = self
            .llm
            .complete_with_system(&self.prompts.system, &prompt)
            .await?;

        tracing::debug!(sources = context_chunks.len(), "answer generated");

        Ok(Answer {
            text: text.trim().to_string(),
            sources: context_chunks.into_iter().map(SourceChunk::from).collect(),
        })
    }

    /// Up to `limit` chunks of the live index; empty when there is none.
    pub async fn list_chunks(&self, limit: usize) -> Result<Vec<SourceChunk>, DomainError> {
        match self.index.current().await {
            Some(index) => Ok(index
                .store()
                .list(limit)
                .await?
                .into_iter()
                .map(SourceChunk::from)
                .collect()),
            None => Ok(Vec::new()),
        }
    }
}

/// One chunk per inline document, tagged with its ordinal `id`.
///
/// The document's own metadata is applied after `id`, so it wins on clashes.
fn inline_chunks(documents: &[SourceDocument]) -> Vec<DocumentChunk> {
    documents
        .iter()
        .enumerate()
        .map(|(i, doc)| {
            let mut metadata = Metadata::new();
            metadata.insert("id".into(), Value::from(i));
            metadata.extend(doc.metadata.clone());
            DocumentChunk::new(doc.content.clone(), i).with_metadata(metadata)
        })
        .collect()
}

/// Keeps ranked chunks while their combined length stays within `budget` chars.
///
/// The top chunk is always kept so the model never gets an empty context.
fn fit_to_budget(results: Vec<SearchResult>, budget: Option<usize>) -> Vec<DocumentChunk> {
    let Some(budget) = budget else {
        return results.into_iter().map(|r| r.chunk).collect();
    };

    let mut used = 0;
    let mut kept = Vec::new();
    for result in results {
        let len = result.chunk.content.chars().count();
        if !kept.is_empty() && used + len > budget {
            break;
        }
        used += len;
        kept.push(result.chunk);
    }
    kept
}
