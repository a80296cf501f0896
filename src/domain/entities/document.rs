use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::DomainError;

/// Free-form metadata carried from a source document onto its chunks.
pub type Metadata = serde_json::Map<String, Value>;

/// A page or section of extracted text, before splitting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub content: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl SourceDocument {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: Uuid,
    pub content: String,
    pub chunk_index: usize,
    pub metadata: Metadata,
}

impl DocumentChunk {
    pub fn new(content: impl Into<String>, chunk_index: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            chunk_index,
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub chunk: DocumentChunk,
    pub score: f32,
}

/// Fixed-window character splitter.
///
/// Windows are `chunk_size` characters long and start every
/// `chunk_size - chunk_overlap` characters, so consecutive chunks of the same
/// document share exactly `chunk_overlap` characters. The last window may be
/// shorter. Sizes count `char`s, not bytes.
#[derive(Debug, Clone, Copy)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, DomainError> {
        if chunk_size == 0 {
            return Err(DomainError::validation("chunk_size must be greater than zero"));
        }
        if chunk_overlap >= chunk_size {
            return Err(DomainError::validation(format!(
                "chunk_overlap ({chunk_overlap}) must be smaller than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    /// Returns `(char_offset, text)` windows. Blank input yields nothing.
    pub fn split_text<'a>(&self, text: &'a str) -> Vec<(usize, &'a str)> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        // Byte position of every char boundary, including the end of the string.
        let bounds: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let char_len = bounds.len() - 1;
        let step = self.chunk_size - self.chunk_overlap;

        let mut windows = Vec::new();
        let mut start = 0;
        loop {
            let end = (start + self.chunk_size).min(char_len);
            windows.push((start, &text[bounds[start]..bounds[end]]));
            if end == char_len {
                break;
            }
            start += step;
        }
        windows
    }

    /// Splits every document and numbers the chunks in order across all of them.
    ///
    /// Each chunk inherits its document's metadata plus `chunk_index` and
    /// `offset` (character offset inside the document).
    pub fn split_documents(&self, documents: &[SourceDocument]) -> Vec<DocumentChunk> {
        let mut chunks = Vec::new();

        for document in documents {
            for (offset, text) in self.split_text(&document.content) {
                let chunk_index = chunks.len();
                let mut metadata = document.metadata.clone();
                metadata.insert("chunk_index".into(), chunk_index.into());
                metadata.insert("offset".into(), offset.into());
                chunks.push(DocumentChunk::new(text, chunk_index).with_metadata(metadata));
            }
        }

        chunks
    }
}
