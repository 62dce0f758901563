use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static SPLIT_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?P<head>\w)-[ \t]*\r?\n[ \t]*(?P<tail>\w)").unwrap());

/// Cleans one extracted page: NFKC normalization, rejoining words split by
/// end-of-line hyphens, and whitespace collapse that keeps paragraph
/// breaks.
pub fn normalize_page(raw: &str) -> String {
    let normalized: String = raw.nfkc().collect();
    let rejoined = SPLIT_WORD.replace_all(&normalized, "$head$tail");

    let mut out = String::with_capacity(rejoined.len());
    let mut pending_break: Option<&str> = None;

    for line in rejoined.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if !out.is_empty() {
                pending_break = Some("\n\n");
            }
            continue;
        }
        if let Some(sep) = pending_break.take() {
            out.push_str(sep);
        }
        push_collapsed(trimmed, &mut out);
        pending_break = Some("\n");
    }

    out
}

/// Normalizes every page in place while keeping page positions intact: an
/// unreadable page stays as an empty entry so downstream page numbering
/// still matches the source document.
pub fn normalize_pages(pages: Vec<String>) -> Vec<String> {
    pages.iter().map(|page| normalize_page(page)).collect()
}

fn push_collapsed(line: &str, out: &mut String) {
    let mut gap = false;
    for ch in line.chars() {
        if ch.is_whitespace() {
            gap = true;
            continue;
        }
        if gap {
            out.push(' ');
            gap = false;
        }
        out.push(ch);
    }
}
