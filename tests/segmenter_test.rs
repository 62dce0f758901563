use tendersift::application::extraction::segmenter::{make_chunks, render_pages};

fn pages(count: usize) -> Vec<String> {
    (1..=count).map(|n| format!("page {n} body text")).collect()
}

#[test]
fn given_pages_when_rendering_then_each_page_carries_its_marker() {
    let rendered = render_pages(&pages(2), 1);

    assert!(rendered.contains("[PAGE:1]\npage 1 body text"));
    assert!(rendered.contains("[PAGE:2]\npage 2 body text"));
}

#[test]
fn given_offset_first_page_when_rendering_then_numbers_stay_document_absolute() {
    let rendered = render_pages(&pages(2), 7);

    assert!(rendered.contains("[PAGE:7]"));
    assert!(rendered.contains("[PAGE:8]"));
    assert!(!rendered.contains("[PAGE:1]\n"));
}

#[test]
fn given_no_pages_when_chunking_then_returns_no_chunks() {
    let chunks = make_chunks(&[], 6, 1);

    assert!(chunks.is_empty());
}

#[test]
fn given_fewer_pages_than_span_when_chunking_then_one_chunk_covers_all() {
    let chunks = make_chunks(&pages(3), 6, 1);

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].start_page, 1);
    assert_eq!(chunks[0].end_page, 3);
    assert_eq!(chunks[0].page_range(), "1-3");
}

#[test]
fn given_exact_span_fit_when_chunking_then_no_trailing_chunk_is_added() {
    let chunks = make_chunks(&pages(6), 6, 1);

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].page_range(), "1-6");
}

#[test]
fn given_overlap_when_chunking_then_consecutive_chunks_share_pages() {
    let chunks = make_chunks(&pages(10), 4, 1);

    let ranges: Vec<String> = chunks.iter().map(|c| c.page_range()).collect();
    assert_eq!(ranges, vec!["1-4", "4-7", "7-10"]);
}

#[test]
fn given_overlap_not_below_span_when_chunking_then_loop_still_terminates() {
    let chunks = make_chunks(&pages(5), 2, 5);

    assert_eq!(chunks.len(), 4);
    assert_eq!(chunks.last().map(|c| c.end_page), Some(5));
}

#[test]
fn given_zero_pages_per_chunk_when_chunking_then_span_clamps_to_one_page() {
    let chunks = make_chunks(&pages(3), 0, 0);

    assert_eq!(chunks.len(), 3);
    for (index, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.start_page, chunk.end_page);
        assert_eq!(chunk.start_page, index as u32 + 1);
    }
}

#[test]
fn given_chunked_pages_when_reading_text_then_markers_match_spanned_pages_only() {
    let chunks = make_chunks(&pages(10), 4, 1);
    let middle = &chunks[1];

    assert!(middle.text.contains("[PAGE:4]"));
    assert!(middle.text.contains("[PAGE:7]"));
    assert!(!middle.text.contains("[PAGE:3]"));
    assert!(!middle.text.contains("[PAGE:8]"));
}

#[test]
fn given_any_chunking_when_collecting_pages_then_every_page_is_covered() {
    let chunks = make_chunks(&pages(11), 3, 2);

    let mut covered = vec![false; 11];
    for chunk in &chunks {
        for page in chunk.start_page..=chunk.end_page {
            covered[page as usize - 1] = true;
        }
    }
    assert!(covered.iter().all(|&seen| seen));
}
