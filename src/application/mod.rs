//! Application layer - Use cases and orchestration.
//!
//! Services depend on domain ports (traits) rather than concrete provider
//! implementations. The live document index is owned here as well.

pub mod index;
pub mod services;

pub use index::{IndexHandle, IndexOrigin, IndexStatus, IndexSummary, VectorIndex};
pub use services::{Answer, IngestReport, IngestService, RagService, RetrievalSettings, SourceChunk};
