use crate::domain::PageChunk;

/// Phrases that mark a chunk as likely to carry extractable tender content.
/// Matching is case-insensitive over the whole chunk text.
const RELEVANT_PHRASES: &[&str] = &[
    "scope of work",
    "eligibility",
    "qualification criteria",
    "bill of quantities",
    "technical specification",
    "terms and conditions",
    "earnest money",
    "emd",
    "bid security",
    "tender fee",
    "document fee",
    "pre-bid",
    "submission deadline",
    "completion period",
    "contract value",
    "estimated cost",
    "penalty",
    "liquidated damages",
    "payment terms",
    "section",
    "schedule",
    "annexure",
];

/// Heading heuristic: a short line consisting entirely of uppercase text,
/// the way tender documents head their sections ("ELIGIBILITY CRITERIA").
/// The segmenter's own `[PAGE:n]` marker lines are uppercase too and must
/// not count, or every chunk would pass the filter.
fn looks_like_heading(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.starts_with("[PAGE:") && trimmed.ends_with(']') {
        return false;
    }
    let char_count = trimmed.chars().count();
    if !(4..=120).contains(&char_count) {
        return false;
    }
    if trimmed.split_whitespace().count() >= 12 {
        return false;
    }
    trimmed.chars().any(|c| c.is_alphabetic()) && trimmed == trimmed.to_uppercase()
}

/// Whether a chunk contains at least one relevance signal.
pub fn is_candidate(chunk: &PageChunk) -> bool {
    let lowered = chunk.text.to_lowercase();
    if RELEVANT_PHRASES.iter().any(|p| lowered.contains(p)) {
        return true;
    }
    chunk.text.lines().any(looks_like_heading)
}

/// Drops chunks with no relevance signal. If no chunk matches, every chunk
/// is kept: an unusual document layout must degrade to more calls, never to
/// an empty extraction.
pub fn filter_candidates(chunks: Vec<PageChunk>) -> Vec<PageChunk> {
    if !chunks.iter().any(is_candidate) {
        return chunks;
    }
    chunks.into_iter().filter(is_candidate).collect()
}
