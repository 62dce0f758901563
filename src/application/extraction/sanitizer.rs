use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[A-Za-z0-9_+-]*").unwrap());

/// Removes markdown code fences and surrounding whitespace. Idempotent, so
/// re-sanitizing already-clean text is harmless.
pub fn strip_code_fences(raw: &str) -> String {
    CODE_FENCE.replace_all(raw, "").trim().to_string()
}

/// Scans a balanced bracket span starting at `start`, which must index a
/// `{` or `[`. Returns the exclusive end of the span, or `None` if the
/// opener is never closed. Brackets inside JSON strings do not count, and
/// a span only closes on the bracket kind that opened it.
fn scan_balanced(bytes: &[u8], start: usize) -> Option<usize> {
    let opener = bytes[start];
    let closer = match opener {
        b'{' => b'}',
        b'[' => b']',
        _ => return None,
    };

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' | b'[' => depth += 1,
            b'}' | b']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    if b == closer {
                        return Some(start + offset + 1);
                    }
                    return None;
                }
            }
            _ => {}
        }
    }
    None
}

/// Finds the longest balanced `{...}` or `[...]` span in `text`. Complete
/// spans are skipped over in one step; an unclosed opener is stepped past
/// so later spans are still found.
pub fn longest_json_span(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut best: Option<(usize, usize)> = None;
    let mut i = 0usize;

    while i < bytes.len() {
        if bytes[i] != b'{' && bytes[i] != b'[' {
            i += 1;
            continue;
        }
        match scan_balanced(bytes, i) {
            Some(end) => {
                if best.is_none_or(|(s, e)| end - i > e - s) {
                    best = Some((i, end));
                }
                i = end;
            }
            None => i += 1,
        }
    }

    best.map(|(s, e)| &text[s..e])
}

/// Last-resort parse for truncated output: drop characters from the end one
/// at a time until the remaining prefix parses. Starts at the first bracket
/// so leading prose never poisons the attempt.
fn truncating_parse<T: DeserializeOwned>(text: &str) -> Option<T> {
    let start = text.find(['{', '['])?;
    let mut cut = text.len();

    while cut > start + 1 {
        if let Ok(value) = serde_json::from_str(&text[start..cut]) {
            return Some(value);
        }
        cut -= 1;
        while cut > start + 1 && !text.is_char_boundary(cut) {
            cut -= 1;
        }
    }
    None
}

/// Extracts a `T` from raw model output that may carry code fences, prose
/// around the JSON, or a truncated tail. Tries the cheap repairs first and
/// returns `None` when nothing parseable remains. Never panics on arbitrary
/// input.
pub fn salvage_parse<T: DeserializeOwned>(raw: &str) -> Option<T> {
    let cleaned = strip_code_fences(raw);
    if cleaned.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str(&cleaned) {
        return Some(value);
    }

    if let Some(span) = longest_json_span(&cleaned) {
        if let Ok(value) = serde_json::from_str(span) {
            return Some(value);
        }
    }

    truncating_parse(&cleaned)
}
