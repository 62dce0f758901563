mod pdf_adapter;
mod text_normalizer;

pub use pdf_adapter::LopdfExtractor;
pub use text_normalizer::{normalize_page, normalize_pages};
