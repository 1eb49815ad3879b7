// In quilldeck/src/models/mod.rs

pub mod document;
pub mod summary;

pub use document::{Document, DocumentType};
pub use summary::{Summary, SummaryLength};

/// A caller-supplied or generated value that breaks an entity invariant.
///
/// `message` is the exact user-facing text, e.g. `"title is required"`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: &'static str,
}

impl ValidationError {
    pub(crate) const fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}
