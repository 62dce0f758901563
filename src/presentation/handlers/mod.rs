mod analyze;
mod chat;
mod documents;
mod extract;
mod health;
mod sections;

pub use analyze::analyze_document_handler;
pub use chat::chat_socket_handler;
pub use documents::{
    delete_document_handler, get_document_handler, list_documents_handler,
    search_documents_handler, upload_document_handler,
};
pub use extract::{extract_scope_handler, extract_summary_handler};
pub use health::health_handler;
pub use sections::analyze_sections_handler;
