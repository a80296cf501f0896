use std::path::Path;

use crate::domain::{errors::DomainError, SourceDocument};

/// Extracts page or section text from a file on disk.
///
/// Loaders are synchronous; callers run them on the blocking pool.
pub trait DocumentLoader: Send + Sync {
    /// `source_name` is the user-facing file name recorded in metadata.
    fn load(&self, path: &Path, source_name: &str) -> Result<Vec<SourceDocument>, DomainError>;
}
