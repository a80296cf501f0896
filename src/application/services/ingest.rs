use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::instrument;

use crate::application::index::IndexOrigin;
use crate::application::services::RagService;
use crate::domain::{DomainError, SourceDocument, TextSplitter};
use crate::infrastructure::loaders::FileKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub file_name: String,
    pub chunk_count: usize,
}

/// Upload pipeline: stage, parse, split, embed, then replace the live index.
pub struct IngestService {
    rag: Arc<RagService>,
    splitter: TextSplitter,
    scratch_dir: PathBuf,
}

impl IngestService {
    pub fn new(rag: Arc<RagService>, splitter: TextSplitter, scratch_dir: PathBuf) -> Self {
        Self {
            rag,
            splitter,
            scratch_dir,
        }
    }

    /// Parses and indexes one uploaded file.
    ///
    /// The live index is swapped only after every chunk is embedded; any
    /// failure leaves it as it was.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn ingest(
        &self,
        kind: FileKind,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<IngestReport, DomainError> {
        let documents = self.load(kind, file_name, bytes).await?;
        let chunks = self.splitter.split_documents(&documents);
        if chunks.is_empty() {
            return Err(DomainError::parse(format!(
                "no extractable text in '{file_name}'"
            )));
        }

        let chunk_count = chunks.len();
        tracing::info!(pages = documents.len(), chunk_count, "document split");

        let origin = IndexOrigin::Upload {
            file_name: file_name.to_string(),
        };
        self.rag
            .index()
            .replace(|| self.rag.build_index(chunks, origin))
            .await?;

        Ok(IngestReport {
            file_name: file_name.to_string(),
            chunk_count,
        })
    }

    /// Writes the upload to a scratch file and runs the loader on the blocking pool.
    ///
    /// The scratch file is removed when this returns. Parser panics surface as errors.
    async fn load(
        &self,
        kind: FileKind,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Vec<SourceDocument>, DomainError> {
        let scratch_dir = self.scratch_dir.clone();
        let source_name = file_name.to_string();

        tokio::task::spawn_blocking(move || {
            let mut scratch = tempfile::Builder::new()
                .prefix("upload-")
                .suffix(&format!(".{}", kind.extension()))
                .tempfile_in(&scratch_dir)?;
            scratch.write_all(&bytes)?;
            scratch.flush()?;

            kind.loader().load(scratch.path(), &source_name)
        })
        .await
        .map_err(|e| DomainError::parse(format!("loader for '{file_name}' aborted: {e}")))?
    }
}
