// In quilldeck/src/models/summary.rs

use super::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Requested length tier for heuristic summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl SummaryLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryLength::Short => "short",
            SummaryLength::Medium => "medium",
            SummaryLength::Long => "long",
        }
    }

    /// Sentence cap used by length-tiered truncation.
    pub fn max_sentences(&self) -> usize {
        match self {
            SummaryLength::Short => 2,
            SummaryLength::Medium => 5,
            SummaryLength::Long => 10,
        }
    }
}

impl FromStr for SummaryLength {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "short" => Ok(SummaryLength::Short),
            "medium" => Ok(SummaryLength::Medium),
            "long" => Ok(SummaryLength::Long),
            _ => Err(ValidationError::new("length", "invalid summary length")),
        }
    }
}

impl fmt::Display for SummaryLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated summary of one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub id: Uuid,
    pub document_id: Uuid,
    pub content: String,
    /// `None` when the text came from a remote model rather than a length tier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<SummaryLength>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Summary {
    pub fn new(
        document_id: Uuid,
        content: impl Into<String>,
        length: Option<SummaryLength>,
        keywords: Vec<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            document_id,
            content: content.into(),
            length,
            keywords,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whitespace-only content counts as empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.document_id.is_nil() {
            return Err(ValidationError::new("document_id", "document_id is required"));
        }
        if self.content.trim().is_empty() {
            return Err(ValidationError::new("content", "content is required"));
        }
        Ok(())
    }

    pub fn update_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.updated_at = Utc::now();
    }
}
