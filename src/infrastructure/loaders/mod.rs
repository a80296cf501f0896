//! File-format loaders for uploaded documents.

mod docx;
mod pdf;

use std::path::Path;

pub use self::docx::DocxLoader;
pub use self::pdf::PdfLoader;

use crate::domain::ports::DocumentLoader;

/// Upload formats the service can parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Docx,
}

impl FileKind {
    /// Detects the format from the file extension, ignoring case.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        }
    }

    pub fn loader(&self) -> &'static dyn DocumentLoader {
        match self {
            Self::Pdf => &PdfLoader,
            Self::Docx => &DocxLoader,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_supported_extensions() {
        assert_eq!(FileKind::from_file_name("lease.pdf"), Some(FileKind::Pdf));
        assert_eq!(FileKind::from_file_name("Lease.PDF"), Some(FileKind::Pdf));
        assert_eq!(FileKind::from_file_name("nda.final.docx"), Some(FileKind::Docx));
    }

    #[test]
    fn test_rejects_other_extensions() {
        assert_eq!(FileKind::from_file_name("notes.txt"), None);
        assert_eq!(FileKind::from_file_name("contract.doc"), None);
        assert_eq!(FileKind::from_file_name("pdf"), None);
        assert_eq!(FileKind::from_file_name(""), None);
    }
}
