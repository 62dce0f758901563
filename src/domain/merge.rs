//! Normalization and picking rules shared by every schema merge.
//!
//! Deduplication across partial results compares identity keys produced by
//! [`normalize_key`]; free-text fields are consolidated with the pickers
//! below so merge output is reproducible for a given partial order.

/// Canonical identity key: lower-cased, internal whitespace collapsed to
/// single spaces, leading/trailing whitespace removed.
pub fn normalize_key(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Identity key for records without a usable name: the normalized first 50
/// characters of the body text.
pub fn body_key(text: &str) -> String {
    let head: String = text.chars().take(50).collect();
    normalize_key(&head)
}

/// Composite key over several text fields, for list items whose identity
/// spans more than one field.
pub fn composite_key(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|part| normalize_key(part))
        .collect::<Vec<_>>()
        .join("|")
}

/// Replaces `slot` when `candidate` is strictly longer; ties keep the
/// first-seen value.
pub fn keep_longest(slot: &mut String, candidate: &str) {
    if !candidate.is_empty() && candidate.len() > slot.len() {
        slot.clear();
        slot.push_str(candidate);
    }
}

/// Fills `slot` from `candidate` only while `slot` is still empty.
pub fn keep_first_non_empty(slot: &mut String, candidate: &str) {
    if slot.is_empty() && !candidate.is_empty() {
        slot.push_str(candidate);
    }
}
