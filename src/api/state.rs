use std::sync::Arc;

use crate::application::{IndexHandle, IngestService, RagService, RetrievalSettings};
use crate::domain::{
    ports::{EmbeddingService, LlmService},
    DomainError, TextSplitter,
};
use crate::infrastructure::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub index: Arc<IndexHandle>,
    pub rag_service: Arc<RagService>,
    pub ingest_service: Arc<IngestService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Wires the services around a fresh, empty index.
    pub fn new(
        config: AppConfig,
        embedding: Arc<dyn EmbeddingService>,
        llm: Arc<dyn LlmService>,
    ) -> Result<Self, DomainError> {
        let rag_config = &config.config.rag;
        let splitter = TextSplitter::new(rag_config.chunk_size, rag_config.chunk_overlap)?;

        let index = Arc::new(IndexHandle::new());
        let rag_service = Arc::new(RagService::new(
            embedding,
            llm,
            index.clone(),
            config.prompts.qa.clone(),
            RetrievalSettings {
                top_k: rag_config.top_k,
                max_context_chars: rag_config.max_context_chars,
            },
        ));
        let ingest_service = Arc::new(IngestService::new(
            rag_service.clone(),
            splitter,
            config.config.upload.scratch_dir(),
        ));

        Ok(Self {
            index,
            rag_service,
            ingest_service,
            config: Arc::new(config),
        })
    }
}
