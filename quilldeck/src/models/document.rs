// In quilldeck/src/models/document.rs

use super::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;

const INVALID_TYPE: ValidationError = ValidationError::new("type", "invalid document type");

/// Upload formats the pipeline accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Txt,
    Md,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Txt => "txt",
            DocumentType::Md => "md",
        }
    }

    /// Detects the type from a `.txt` or `.md` extension, ignoring case.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ValidationError> {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|s| s.to_str())
            .ok_or(INVALID_TYPE)?;
        extension.to_ascii_lowercase().parse()
    }
}

impl FromStr for DocumentType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "txt" => Ok(DocumentType::Txt),
            "md" => Ok(DocumentType::Md),
            _ => Err(INVALID_TYPE),
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An uploaded artifact and its processing state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    /// Byte length of `content`, fixed at creation.
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
}

impl Document {
    pub fn new(
        user_id: Uuid,
        title: impl Into<String>,
        content: impl Into<String>,
        doc_type: DocumentType,
    ) -> Self {
        let content = content.into();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: title.into(),
            size: content.len() as u64,
            content,
            doc_type,
            uploaded_at: Utc::now(),
            processed_at: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.user_id.is_nil() {
            return Err(ValidationError::new("user_id", "user_id is required"));
        }
        if self.title.is_empty() {
            return Err(ValidationError::new("title", "title is required"));
        }
        if self.content.is_empty() {
            return Err(ValidationError::new("content", "content is required"));
        }
        Ok(())
    }

    /// Stamps `processed_at` with the current time. Calling it again refreshes the stamp.
    pub fn mark_processed(&mut self) {
        self.processed_at = Some(Utc::now());
    }

    pub fn is_processed(&self) -> bool {
        self.processed_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(user_id: Uuid, title: &str, content: &str) -> Document {
        Document::new(user_id, title, content, DocumentType::Txt)
    }

    #[test]
    fn new_document_computes_size_and_starts_unprocessed() {
        let user_id = Uuid::new_v4();
        let content = "This is test content";
        let document = doc(user_id, "Test Document", content);

        assert!(!document.id.is_nil());
        assert_eq!(document.user_id, user_id);
        assert_eq!(document.title, "Test Document");
        assert_eq!(document.size, content.len() as u64);
        assert!(document.processed_at.is_none());
        assert!(!document.is_processed());
    }

    #[test]
    fn size_counts_bytes_not_characters() {
        let document = doc(Uuid::new_v4(), "utf8", "要約");
        assert_eq!(document.size, 6);
    }

    #[test]
    fn validate_reports_the_missing_field() {
        let user_id = Uuid::new_v4();
        let cases = [
            (doc(Uuid::nil(), "Test", "Content"), "user_id", "user_id is required"),
            (doc(user_id, "", "Content"), "title", "title is required"),
            (doc(user_id, "Test", ""), "content", "content is required"),
        ];

        for (document, field, message) in cases {
            let err = document.validate().expect_err("document should be invalid");
            assert_eq!(err.field, field);
            assert_eq!(err.to_string(), message);
        }

        assert!(doc(user_id, "Test", "Content").validate().is_ok());
    }

    #[test]
    fn unknown_type_strings_are_rejected() {
        assert_eq!("md".parse::<DocumentType>(), Ok(DocumentType::Md));
        let err = "pdf".parse::<DocumentType>().unwrap_err();
        assert_eq!(err.to_string(), "invalid document type");
        assert!("TXT".parse::<DocumentType>().is_err());
    }

    #[test]
    fn type_is_detected_from_file_extension() {
        assert_eq!(DocumentType::from_path("notes.TXT"), Ok(DocumentType::Txt));
        assert_eq!(DocumentType::from_path("dir/readme.md"), Ok(DocumentType::Md));
        assert!(DocumentType::from_path("slides.pdf").is_err());
        assert!(DocumentType::from_path("Makefile").is_err());
    }

    #[test]
    fn mark_processed_sets_timestamp() {
        let mut document = doc(Uuid::new_v4(), "Test", "Content");
        document.mark_processed();

        assert!(document.is_processed());
        assert!(document.processed_at.unwrap() >= document.uploaded_at);
    }

    #[test]
    fn serializes_type_field_and_omits_missing_processed_at() {
        let document = Document::new(Uuid::new_v4(), "Notes", "body", DocumentType::Md);
        let value = serde_json::to_value(&document).unwrap();

        assert_eq!(value["type"], "md");
        assert_eq!(value["size"], 4);
        assert!(value.get("processed_at").is_none());
    }
}
