//! Document question-answering service.
//!
//! Upload a PDF or DOCX, have it split, embedded and held in an in-memory
//! vector index, then ask questions answered by a language model over the
//! retrieved chunks.

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;
