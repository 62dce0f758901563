mod chat_responder;
mod completion_backend;
mod page_extractor;

pub use chat_responder::{ChatError, ChatResponder};
pub use completion_backend::{CompletionBackend, CompletionError, CompletionOptions};
pub use page_extractor::{PageExtractor, PageExtractorError};
