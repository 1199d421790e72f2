// File: ./src/writer/mod.rs
use crate::document::SealedDocument;
use crate::error::PlannerResult;
use std::path::Path;

pub mod pdf;

pub use pdf::PdfWriter;

/// Serializes a sealed document. Implementations must not leave a partial
/// file at `path` when they fail.
pub trait DocumentWriter {
    fn write(&self, document: &SealedDocument, path: &Path) -> PlannerResult<()>;
}
