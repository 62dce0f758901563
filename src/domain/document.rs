use chrono::{DateTime, Utc};

/// One uploaded document held in process memory. Page texts are immutable
/// once extracted; the id is derived from the file content, so re-uploading
/// the same bytes replaces the existing record instead of duplicating it.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub filename: String,
    pub pages: Vec<String>,
    pub metadata: DocumentMetadata,
    pub uploaded_at: DateTime<Utc>,
}

/// Best-effort metadata read from the document itself. Fields absent from
/// the file stay `None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocumentMetadata {
    pub page_count: usize,
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
}

/// Lightweight listing view of a stored document, without page text.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSummary {
    pub id: String,
    pub filename: String,
    pub page_count: usize,
    pub uploaded_at: DateTime<Utc>,
}

impl StoredDocument {
    pub fn new(
        id: String,
        filename: String,
        pages: Vec<String>,
        metadata: DocumentMetadata,
    ) -> Self {
        Self {
            id,
            filename,
            pages,
            metadata,
            uploaded_at: Utc::now(),
        }
    }

    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.id.clone(),
            filename: self.filename.clone(),
            page_count: self.pages.len(),
            uploaded_at: self.uploaded_at,
        }
    }
}
