use async_trait::async_trait;

use crate::domain::DocumentMetadata;

/// Produces ordered per-page plain text from raw document bytes.
#[async_trait]
pub trait PageExtractor: Send + Sync {
    /// Page texts in document order; empty when the document has no
    /// extractable text. Unreadable pages yield empty strings so page
    /// numbering stays aligned with the document.
    async fn extract_pages(&self, data: &[u8]) -> Result<Vec<String>, PageExtractorError>;

    /// Best-effort metadata; fields the document does not carry stay `None`.
    async fn extract_metadata(&self, data: &[u8]) -> Result<DocumentMetadata, PageExtractorError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PageExtractorError {
    #[error("failed to parse document: {0}")]
    InvalidDocument(String),
    #[error("page extraction timed out")]
    Timeout,
}
