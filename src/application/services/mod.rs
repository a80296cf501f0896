mod ingest;
mod rag;

pub use ingest::{IngestReport, IngestService};
pub use rag::{Answer, RagService, RetrievalSettings, SourceChunk};
