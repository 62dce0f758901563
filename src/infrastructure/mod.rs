pub mod llm;
pub mod observability;
pub mod store;
pub mod text_processing;
