use docx_rs::{
    read_docx, DocumentChild, Table, TableCellContent, TableChild, TableRowChild,
};
use std::path::Path;

use crate::domain::{ports::DocumentLoader, DomainError, SourceDocument};

/// Whole document as a single section, one line per paragraph.
///
/// Table cells are read row by row, each cell paragraph on its own line, in
/// document order with the body paragraphs. Nested tables are walked too.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxLoader;

impl DocumentLoader for DocxLoader {
    fn load(&self, path: &Path, source_name: &str) -> Result<Vec<SourceDocument>, DomainError> {
        let bytes = std::fs::read(path)?;
        let docx = read_docx(&bytes)
            .map_err(|e| DomainError::parse(format!("DOCX '{source_name}': {e}")))?;

        let mut lines = Vec::new();
        for child in &docx.document.children {
            match child {
                DocumentChild::Paragraph(p) => lines.push(p.raw_text()),
                DocumentChild::Table(table) => table_lines(table, &mut lines),
                _ => {}
            }
        }

        Ok(vec![
            SourceDocument::new(lines.join("\n")).with_field("source", source_name)
        ])
    }
}

fn table_lines(table: &Table, lines: &mut Vec<String>) {
    for TableChild::TableRow(row) in &table.rows {
        for TableRowChild::TableCell(cell) in &row.cells {
            for content in &cell.children {
                match content {
                    TableCellContent::Paragraph(p) => lines.push(p.raw_text()),
                    TableCellContent::Table(nested) => table_lines(nested, lines),
                    _ => {}
                }
            }
        }
    }
}
