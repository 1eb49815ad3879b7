// quilldeck/src/service.rs
//!
//! Document service: upload validation, lifecycle tracking and summary generation.
//!
//! A document is `Uploaded` until the first successful `generate_summary`,
//! after which it stays `Processed`; re-summarizing adds summaries without
//! touching that state. The service keeps no state between calls and takes no
//! locks, so two concurrent summaries of one document both land and the later
//! document write wins.

use crate::config::{Config, LlmConfig};
use crate::model_adapters::{summarization_prompt, ChatCompletionsAdapter, ModelAdapter};
use crate::models::{Document, DocumentType, Summary, SummaryLength};
use crate::store::{DocumentStore, SummaryStore};
use crate::summarizer::{extract_keywords, LocalSummarizer};
use crate::Error;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Per-call options for [`DocumentService::generate_summary_with`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryRequest {
    /// Length tier for the local summarizer. `None` uses the configured default.
    pub length: Option<SummaryLength>,
    /// Upper bound for the remote call; overrides the configured timeout.
    pub timeout: Option<Duration>,
}

struct RemoteSummarizer {
    adapter: Box<dyn ModelAdapter>,
    style: String,
    max_chars: usize,
}

pub struct DocumentService {
    documents: Arc<dyn DocumentStore>,
    summaries: Arc<dyn SummaryStore>,
    summarizer: LocalSummarizer,
    default_length: SummaryLength,
    remote: Option<RemoteSummarizer>,
}

impl DocumentService {
    /// Builds the service from process configuration. A remote backend is
    /// wired in only when both the LLM base URL and API key are set.
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        summaries: Arc<dyn SummaryStore>,
        config: &Config,
    ) -> Result<Self, Error> {
        let mut service = Self {
            documents,
            summaries,
            summarizer: LocalSummarizer::new(config.summarizer.policy),
            default_length: config.summarizer.default_length,
            remote: None,
        };

        if config.llm.is_configured() {
            let adapter = ChatCompletionsAdapter::new(&config.llm)
                .map_err(|e| Error::internal("failed to configure LLM client", e))?;
            tracing::info!(base_url = %config.llm.base_url, model = %config.llm.model, "remote summarization enabled");
            service = service.with_model_adapter(Box::new(adapter), &config.llm);
        } else {
            tracing::info!(policy = ?config.summarizer.policy, "remote summarization disabled, using local summarizer");
        }

        Ok(service)
    }

    /// Replaces the remote backend. Prompt style and budget come from `llm`.
    pub fn with_model_adapter(mut self, adapter: Box<dyn ModelAdapter>, llm: &LlmConfig) -> Self {
        self.remote = Some(RemoteSummarizer {
            adapter,
            style: llm.style.clone(),
            max_chars: llm.max_chars,
        });
        self
    }

    pub fn uses_remote_backend(&self) -> bool {
        self.remote.is_some()
    }

    pub fn upload_document(
        &self,
        user_id: Uuid,
        title: &str,
        content: &str,
        doc_type: DocumentType,
    ) -> Result<Document, Error> {
        let document = Document::new(user_id, title, content, doc_type);

        document
            .validate()
            .map_err(|e| Error::validation("invalid document data", e))?;

        self.documents
            .create(&document)
            .map_err(|e| Error::internal("failed to create document", e))?;

        tracing::info!(document_id = %document.id, user_id = %user_id, size = document.size, doc_type = %doc_type, "document uploaded");
        Ok(document)
    }

    pub fn get_document(&self, document_id: Uuid) -> Result<Document, Error> {
        self.documents
            .get_by_id(document_id)
            .map_err(|e| Error::internal("failed to load document", e))?
            .ok_or_else(|| Error::NotFound(format!("document {document_id} not found")))
    }

    pub fn get_user_documents(&self, user_id: Uuid) -> Result<Vec<Document>, Error> {
        self.documents
            .get_by_user_id(user_id)
            .map_err(|e| Error::internal("failed to get user documents", e))
    }

    pub fn get_summary(&self, summary_id: Uuid) -> Result<Summary, Error> {
        self.summaries
            .get_by_id(summary_id)
            .map_err(|e| Error::internal("failed to load summary", e))?
            .ok_or_else(|| Error::NotFound(format!("summary {summary_id} not found")))
    }

    /// Summary history for a document, oldest first.
    pub fn get_document_summaries(&self, document_id: Uuid) -> Result<Vec<Summary>, Error> {
        self.get_document(document_id)?;
        self.summaries
            .get_by_document_id(document_id)
            .map_err(|e| Error::internal("failed to get document summaries", e))
    }

    pub fn generate_summary(
        &self,
        document_id: Uuid,
        length: Option<SummaryLength>,
    ) -> Result<Summary, Error> {
        self.generate_summary_with(
            document_id,
            SummaryRequest {
                length,
                ..SummaryRequest::default()
            },
        )
    }

    /// Loads the document, summarizes it, stores the summary and marks the
    /// document processed.
    ///
    /// The two writes are not atomic. If the document update fails after the
    /// summary was stored, [`Error::PartiallyCommitted`] is returned and the
    /// caller should re-read state rather than assume a rollback.
    pub fn generate_summary_with(
        &self,
        document_id: Uuid,
        request: SummaryRequest,
    ) -> Result<Summary, Error> {
        let mut document = self.get_document(document_id)?;

        let summary = match &self.remote {
            Some(remote) => {
                let prompt = summarization_prompt(&document.content, &remote.style, remote.max_chars);
                let generation = remote
                    .adapter
                    .generate(&prompt, request.timeout)
                    .map_err(|e| Error::internal("failed to get summary from LLM", e))?;
                tracing::debug!(
                    document_id = %document_id,
                    provider = remote.adapter.provider_name(),
                    total_tokens = generation.usage.total_tokens,
                    "remote summary received"
                );
                Summary::new(
                    document_id,
                    generation.response,
                    None,
                    extract_keywords(&document.content),
                )
            }
            None => {
                let length = request.length.unwrap_or(self.default_length);
                let local = self.summarizer.summarize(&document.content, Some(length));
                Summary::new(document_id, local.content, local.length, local.keywords)
            }
        };

        summary
            .validate()
            .map_err(|e| Error::validation("invalid summary data", e))?;

        self.summaries
            .create(&summary)
            .map_err(|e| Error::internal("failed to create summary", e))?;

        document.mark_processed();
        if let Err(e) = self.documents.update(&document) {
            tracing::warn!(
                summary_id = %summary.id,
                document_id = %document_id,
                error = %e,
                "summary stored but document could not be marked processed"
            );
            return Err(Error::PartiallyCommitted {
                summary_id: summary.id,
                document_id,
                source: e.into(),
            });
        }

        tracing::info!(
            document_id = %document_id,
            summary_id = %summary.id,
            keywords = summary.keywords.len(),
            remote = self.remote.is_some(),
            "summary generated"
        );
        Ok(summary)
    }
}
