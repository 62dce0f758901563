use std::time::Duration;

use async_trait::async_trait;
use lopdf::{Document, Object};

use crate::application::ports::{PageExtractor, PageExtractorError};
use crate::domain::DocumentMetadata;

use super::text_normalizer::normalize_pages;

const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Page-by-page PDF text extraction backed by lopdf. Parsing runs on the
/// blocking pool under a hard timeout; a page whose content stream cannot
/// be decoded becomes an empty entry, never a shifted page number.
#[derive(Default)]
pub struct LopdfExtractor;

impl LopdfExtractor {
    pub fn new() -> Self {
        Self
    }

    fn extract_pages_blocking(data: &[u8]) -> Result<Vec<String>, PageExtractorError> {
        let doc = Document::load_mem(data).map_err(|e| {
            PageExtractorError::InvalidDocument(format!("failed to parse PDF: {e}"))
        })?;

        // get_pages keys are 1-based page numbers in a BTreeMap, so the
        // iteration order is already the document order.
        let pages = doc
            .get_pages()
            .keys()
            .map(|&page_number| doc.extract_text(&[page_number]).unwrap_or_default())
            .collect();

        Ok(normalize_pages(pages))
    }

    fn extract_metadata_blocking(data: &[u8]) -> Result<DocumentMetadata, PageExtractorError> {
        let doc = Document::load_mem(data).map_err(|e| {
            PageExtractorError::InvalidDocument(format!("failed to parse PDF: {e}"))
        })?;

        let mut metadata = DocumentMetadata {
            page_count: doc.get_pages().len(),
            ..DocumentMetadata::default()
        };

        if let Some(info) = info_dictionary(&doc) {
            metadata.title = info_text(info, &doc, b"Title");
            metadata.author = info_text(info, &doc, b"Author");
            metadata.subject = info_text(info, &doc, b"Subject");
        }

        Ok(metadata)
    }
}

fn info_dictionary(doc: &Document) -> Option<&lopdf::Dictionary> {
    let info = doc.trailer.get(b"Info").ok()?;
    let resolved = match info {
        Object::Reference(id) => doc.get_object(*id).ok()?,
        other => other,
    };
    resolved.as_dict().ok()
}

fn info_text(info: &lopdf::Dictionary, doc: &Document, key: &[u8]) -> Option<String> {
    let value = info.get(key).ok()?;
    let resolved = match value {
        Object::Reference(id) => doc.get_object(*id).ok()?,
        other => other,
    };
    match resolved {
        Object::String(bytes, _) => {
            let text = decode_pdf_string(bytes);
            let trimmed = text.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        _ => None,
    }
}

/// PDF text strings are either UTF-16BE with a BOM or a byte encoding
/// close enough to Latin-1 for metadata fields.
fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.starts_with(&[0xFE, 0xFF]) {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        bytes.iter().map(|&b| b as char).collect()
    }
}

#[async_trait]
impl PageExtractor for LopdfExtractor {
    #[tracing::instrument(skip(self, data), fields(bytes = data.len()))]
    async fn extract_pages(&self, data: &[u8]) -> Result<Vec<String>, PageExtractorError> {
        let owned = data.to_vec();
        let pages = tokio::time::timeout(
            EXTRACTION_TIMEOUT,
            tokio::task::spawn_blocking(move || Self::extract_pages_blocking(&owned)),
        )
        .await
        .map_err(|_| PageExtractorError::Timeout)?
        .map_err(|e| PageExtractorError::InvalidDocument(format!("task join error: {e}")))??;

        tracing::info!(page_count = pages.len(), "PDF text extraction complete");
        Ok(pages)
    }

    async fn extract_metadata(&self, data: &[u8]) -> Result<DocumentMetadata, PageExtractorError> {
        let owned = data.to_vec();
        tokio::time::timeout(
            EXTRACTION_TIMEOUT,
            tokio::task::spawn_blocking(move || Self::extract_metadata_blocking(&owned)),
        )
        .await
        .map_err(|_| PageExtractorError::Timeout)?
        .map_err(|e| PageExtractorError::InvalidDocument(format!("task join error: {e}")))?
    }
}
