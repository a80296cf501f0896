pub mod config;
pub mod embedding;
pub mod llm;
pub mod loaders;
pub mod vector_store;

pub use config::{AppConfig, Config, PromptsConfig};
pub use embedding::TextEmbedding;
pub use llm::OpenAiLlm;
pub use loaders::{DocxLoader, FileKind, PdfLoader};
pub use vector_store::InMemoryVectorStore;
