use std::path::Path;

use crate::domain::{ports::DocumentLoader, DomainError, SourceDocument};

/// One document per PDF page, tagged with `source`, `page` (1-based) and `total_pages`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfLoader;

impl DocumentLoader for PdfLoader {
    fn load(&self, path: &Path, source_name: &str) -> Result<Vec<SourceDocument>, DomainError> {
        let pages = pdf_extract::extract_text_by_pages(path)
            .map_err(|e| DomainError::parse(format!("PDF '{source_name}': {e}")))?;
        let total_pages = pages.len();

        Ok(pages
            .into_iter()
            .enumerate()
            .map(|(i, text)| {
                SourceDocument::new(text)
                    .with_field("source", source_name)
                    .with_field("page", i + 1)
                    .with_field("total_pages", total_pages)
            })
            .collect())
    }
}
