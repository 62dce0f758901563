use std::collections::HashMap;

use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use crate::domain::{DocumentSummary, Embedding, StoredDocument};

/// Word-boundary packing target for indexed chunks, in characters.
const CHUNK_TARGET: usize = 1000;

const DEFAULT_TOP_K: usize = 5;

/// In-process document store with a keyword-similarity index. Uploads are
/// chunked and embedded at insert time; search is a linear scan over every
/// chunk, which is plenty for a store that holds a working set of tender
/// documents rather than a corpus.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    entries: RwLock<HashMap<String, StoreEntry>>,
}

struct StoreEntry {
    document: StoredDocument,
    chunks: Vec<IndexedChunk>,
}

struct IndexedChunk {
    text: String,
    embedding: Embedding,
}

/// One search match: the chunk text plus where it came from.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub document_id: String,
    pub chunk_text: String,
    pub score: f32,
}

/// Content-addressed document id, so re-uploading identical bytes lands on
/// the same record.
pub fn content_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a document, replacing any record with the same id, and
    /// indexes its text for search.
    pub async fn insert(&self, document: StoredDocument) {
        let full_text = document.pages.join("\n\n");
        let chunks = chunk_text(&full_text, CHUNK_TARGET)
            .into_iter()
            .map(|text| IndexedChunk {
                embedding: Embedding::from_text(&text),
                text,
            })
            .collect();

        let id = document.id.clone();
        let mut entries = self.entries.write().await;
        entries.insert(id.clone(), StoreEntry { document, chunks });
        tracing::info!(document_id = %id, "Document stored");
    }

    pub async fn get(&self, id: &str) -> Option<StoredDocument> {
        let entries = self.entries.read().await;
        entries.get(id).map(|entry| entry.document.clone())
    }

    pub async fn list(&self) -> Vec<DocumentSummary> {
        let entries = self.entries.read().await;
        let mut summaries: Vec<DocumentSummary> = entries
            .values()
            .map(|entry| entry.document.summary())
            .collect();
        summaries.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        summaries
    }

    /// Removes a document. Returns false when the id was not present.
    pub async fn remove(&self, id: &str) -> bool {
        let mut entries = self.entries.write().await;
        entries.remove(id).is_some()
    }

    /// Top-k chunks most similar to the query, across all documents.
    /// A `top_k` of zero falls back to the default of five.
    pub async fn search(&self, query: &str, top_k: usize) -> Vec<SearchHit> {
        let limit = if top_k == 0 { DEFAULT_TOP_K } else { top_k };
        let query_embedding = Embedding::from_text(query);

        let entries = self.entries.read().await;
        let query_embedding = &query_embedding;
        let mut hits: Vec<SearchHit> = entries
            .iter()
            .flat_map(|(id, entry)| {
                entry.chunks.iter().map(move |chunk| SearchHit {
                    document_id: id.clone(),
                    chunk_text: chunk.text.clone(),
                    score: query_embedding.cosine_similarity(&chunk.embedding),
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(limit);
        hits
    }
}

/// Splits text into chunks of roughly `max_len` characters, breaking only
/// between words. A single word longer than `max_len` becomes its own
/// chunk rather than being split.
fn chunk_text(text: &str, max_len: usize) -> Vec<String> {
    let target = max_len.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + word.len() + 1 > target {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
