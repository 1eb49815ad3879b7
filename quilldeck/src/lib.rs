// In quilldeck/src/lib.rs

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use uuid::Uuid;

// The shared database pool type
pub type DbPool = Pool<SqliteConnectionManager>;

pub mod config;
pub mod model_adapters;
pub mod models;
pub mod service;
pub mod store;
pub mod summarizer;

pub use config::Config;
pub use models::{Document, DocumentType, Summary, SummaryLength, ValidationError};
pub use service::{DocumentService, SummaryRequest};
pub use summarizer::{LocalSummarizer, SummaryPolicy};

/// Coarse classification callers map onto their own conventions (status codes, exit codes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Unauthorized,
    Internal,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::Internal => "INTERNAL_ERROR",
        }
    }
}

// The pipeline's error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("VALIDATION_ERROR: {context}: {source}")]
    Validation {
        context: &'static str,
        #[source]
        source: ValidationError,
    },
    #[error("NOT_FOUND: {0}")]
    NotFound(String),
    #[error("UNAUTHORIZED: {0}")]
    Unauthorized(String),
    #[error("INTERNAL_ERROR: {context}: {source:#}")]
    Internal {
        context: String,
        #[source]
        source: anyhow::Error,
    },
    /// The summary row exists but the document was not marked processed.
    #[error(
        "INTERNAL_ERROR: summary {summary_id} was stored but document {document_id} could not be marked processed: {source:#}"
    )]
    PartiallyCommitted {
        summary_id: Uuid,
        document_id: Uuid,
        #[source]
        source: anyhow::Error,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation { .. } => ErrorKind::Validation,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Unauthorized(_) => ErrorKind::Unauthorized,
            Error::Internal { .. } | Error::PartiallyCommitted { .. } => ErrorKind::Internal,
        }
    }

    pub(crate) fn validation(context: &'static str, source: ValidationError) -> Self {
        Error::Validation { context, source }
    }

    pub(crate) fn internal(context: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Error::Internal {
            context: context.into(),
            source: source.into(),
        }
    }
}

impl serde::Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}
