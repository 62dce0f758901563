mod chunk;
mod document;
mod embedding;
pub mod merge;
pub mod schemas;

pub use chunk::PageChunk;
pub use document::{DocumentMetadata, DocumentSummary, StoredDocument};
pub use embedding::{EMBEDDING_DIMENSIONS, Embedding};
