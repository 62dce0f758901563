use crate::application::extraction::ExtractionTask;
use crate::domain::PageChunk;
use crate::domain::schemas::SectionReport;

const SINGLE_PROMPT: &str = r#"You are an expert document parser. Read the DOCUMENT below and extract every logical section into a JSON array of section objects.

Each section object must have exactly these keys:
- "section_name": short title of the section (string)
- "section_summary": concise 1-3 sentence summary of what the section says; summarize only what is present, never invent
- "key_considerations": array of objects shaped { "text": "...", "critical": true|false, "page": "page number or range where this appears" }

Rules:
- Respond with a SINGLE valid JSON array and nothing else.
- Set "critical": true when the language flags the item as critical, mandatory or penalty-bearing, or when it carries deadlines, percentages or amounts a bidder must act on.
- Take page numbers from the [PAGE:n] markers in the text.
- If no sections can be found, return an empty array []."#;

const CHUNK_PROMPT: &str = r#"You are an expert document parser. From the DOCUMENT CHUNK below extract every section present in this chunk and return a single valid JSON array of section objects with keys:
- "section_name"
- "section_summary"
- "key_considerations": [ { "text": "...", "critical": true|false, "page": "..." }, ... ]

Rules:
- Return JSON only, no explanation.
- Take page numbers from the [PAGE:n] markers in the chunk."#;

const AGGREGATE_PROMPT: &str = r#"You are given several JSON arrays of section objects, each extracted from one chunk of the same document. Combine them into one consolidated JSON array.

Rules:
- Merge sections whose names are the same or clearly refer to the same section; keep the longest summary and combine their key_considerations, dropping case-insensitive exact duplicates.
- Keep the page provenance of every key consideration.
- Do not invent facts that appear in no input.
- Return a single valid JSON array of objects with keys section_name, section_summary, key_considerations and nothing else."#;

/// Sectionwise analysis: every logical section with a summary and flagged
/// key considerations.
pub struct SectionTask;

impl ExtractionTask for SectionTask {
    type Output = SectionReport;

    fn name(&self) -> &'static str {
        "sectionwise_analysis"
    }

    fn single_prompt(&self, document_text: &str) -> String {
        format!("{SINGLE_PROMPT}\n\nDOCUMENT:\n{document_text}")
    }

    fn chunk_prompt(&self, chunk: &PageChunk) -> String {
        format!("{CHUNK_PROMPT}\n\nDOCUMENT CHUNK:\n{}", chunk.text)
    }

    fn aggregate_prompt(&self, partials_json: &str) -> String {
        format!("{AGGREGATE_PROMPT}\n\nChunk-level JSON arrays:\n{partials_json}")
    }
}
