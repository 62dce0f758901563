mod document_store;

pub use document_store::{InMemoryDocumentStore, SearchHit, content_hash};
