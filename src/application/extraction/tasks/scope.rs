use crate::application::extraction::ExtractionTask;
use crate::domain::PageChunk;
use crate::domain::schemas::ScopeOfWork;

const SINGLE_PROMPT: &str = r#"You are an expert document parser. Extract ONLY the following three structured fields from the DOCUMENT below, inventing nothing:

1) project_overview: object with keys project_name, location, total_length, project_duration, contract_value. A missing field becomes an empty string.

2) major_work_components: array of objects
   [ { "s_no": "...", "work_description": "...", "quantity_specification": "...", "unit": "..." }, ... ]
   or an empty list if none are present.

3) technical_standards: array of objects
   [ { "component": "...", "standard_specification": "...", "compliance_required": "..." }, ... ]
   or an empty list if none are present.

Rules:
- Respond in valid JSON only, with exact keys: {"project_overview": {...}, "major_work_components": [...], "technical_standards": [...]}.
- No explanations and no text outside the single JSON object.
- Add brief page references such as "(page 4)" inside values where the source page is clear, using the [PAGE:n] markers."#;

const CHUNK_PROMPT: &str = r#"You are a document parser. From the DOCUMENT CHUNK below extract ONLY these three structured fields as JSON:
- project_overview: { "project_name", "location", "total_length", "project_duration", "contract_value" }
- major_work_components: [ { "s_no", "work_description", "quantity_specification", "unit" } ]
- technical_standards: [ { "component", "standard_specification", "compliance_required" } ]

Return one valid JSON object only. A field absent from this chunk becomes an empty string or empty list."#;

const AGGREGATE_PROMPT: &str = r#"You are given several chunk-level JSON extraction results from the same document. Combine them into one consolidated JSON object with this schema:

{
  "project_overview": { "project_name": "...", "location": "...", "total_length": "...", "project_duration": "...", "contract_value": "..." },
  "major_work_components": [ ... ],
  "technical_standards": [ ... ]
}

Rules:
- Prefer non-empty project_overview values; when non-empty values conflict, prefer page-referenced ones, then the most frequent.
- Merge the lists and drop case-insensitive exact duplicates.
- Do not invent values absent from every chunk result.
- Return one valid JSON object and nothing else."#;

/// Scope-of-work extraction: project facts, work components and the
/// technical standards they must meet.
pub struct ScopeTask;

impl ExtractionTask for ScopeTask {
    type Output = ScopeOfWork;

    fn name(&self) -> &'static str {
        "scope_of_work"
    }

    fn single_prompt(&self, document_text: &str) -> String {
        format!("{SINGLE_PROMPT}\n\nDOCUMENT:\n{document_text}")
    }

    fn chunk_prompt(&self, chunk: &PageChunk) -> String {
        format!("{CHUNK_PROMPT}\n\nDOCUMENT CHUNK:\n{}", chunk.text)
    }

    fn aggregate_prompt(&self, partials_json: &str) -> String {
        format!("{AGGREGATE_PROMPT}\n\nChunk findings:\n{partials_json}")
    }
}
