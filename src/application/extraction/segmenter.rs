use crate::domain::PageChunk;

/// Renders pages into one text block, each page preceded by its literal
/// `[PAGE:n]` marker. `first_page` is the 1-based number of the first page
/// in the slice, so chunk text keeps document-absolute page numbers.
pub fn render_pages(pages: &[String], first_page: u32) -> String {
    let blocks: Vec<String> = pages
        .iter()
        .enumerate()
        .map(|(offset, page)| format!("[PAGE:{}]\n{}", first_page + offset as u32, page))
        .collect();
    blocks.join("\n\n")
}

/// Splits page-indexed text into overlapping multi-page chunks.
///
/// Each chunk spans up to `pages_per_chunk` pages and consecutive chunks
/// share `overlap_pages` trailing pages. An overlap of `pages_per_chunk` or
/// more would make the next start index not advance, so it is clamped to
/// `pages_per_chunk - 1`; without the clamp the loop never terminates.
///
/// Zero pages produce zero chunks; callers treat that as "nothing to
/// extract", not as an error.
pub fn make_chunks(
    pages: &[String],
    pages_per_chunk: usize,
    overlap_pages: usize,
) -> Vec<PageChunk> {
    if pages.is_empty() {
        return Vec::new();
    }

    let span = pages_per_chunk.max(1);
    let overlap = overlap_pages.min(span - 1);
    let total = pages.len();

    let mut chunks = Vec::new();
    let mut start = 0usize;
    loop {
        let end = (start + span).min(total);
        let text = render_pages(&pages[start..end], start as u32 + 1);
        chunks.push(PageChunk::new(start as u32 + 1, end as u32, text));

        if end == total {
            break;
        }
        start = end - overlap;
    }

    chunks
}
