mod document;
mod embedding;

pub use document::{DocumentChunk, Metadata, SearchResult, SourceDocument, TextSplitter};
pub use embedding::Embedding;
