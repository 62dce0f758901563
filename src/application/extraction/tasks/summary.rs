use crate::application::extraction::ExtractionTask;
use crate::domain::PageChunk;
use crate::domain::schemas::TenderSummary;

const SINGLE_PROMPT: &str = r#"You are an expert legal and tender document parser. From the DOCUMENT below extract a one-page Tender Summary as ONE strict JSON object with exactly these keys:

{
  "project_overview": "short paragraph summarizing the project (do NOT invent)",
  "eligibility_highlights": [ up to 4 most relevant eligibility items as strings ],
  "important_dates": {
    "pre_bid_queries": "date, date range or text if present",
    "bid_submission": "date and time",
    "other_dates": [ { "name": "...", "date": "..." } ]
  },
  "financial_requirements": {
    "contract_value": "short value, e.g. 'INR 10,00,00,000'",
    "document_fees": "short value"
  },
  "risk_analysis": {
    "penalty_risk": "one-sentence description of penalty exposure if present",
    "other_risks": [ { "name": "...", "detail": "..." } ]
  }
}

Rules:
- Respond in valid JSON only, nothing else.
- Never invent facts; a missing field becomes an empty string or empty list.
- Append page provenance such as " (page 4)" or " (pages 2-5)" inside values, using the [PAGE:n] markers.
- For eligibility_highlights pick the up to 4 clearest eligibility criteria in the document.
- Look explicitly for pre-bid query and bid submission dates; put every other notable date in other_dates.
- For contract_value prefer the value labelled as the published tender or contract value.
- Summarize any penalty or liquidated damages clause in penalty_risk as one sentence."#;

const CHUNK_PROMPT: &str = r#"You are an expert tender document parser. From the DOCUMENT CHUNK below extract the same Tender Summary object and return one valid JSON object with exactly these keys:

{
  "project_overview": "...",
  "eligibility_highlights": [...],
  "important_dates": { "pre_bid_queries": "...", "bid_submission": "...", "other_dates": [ { "name": "...", "date": "..." } ] },
  "financial_requirements": { "contract_value": "...", "document_fees": "..." },
  "risk_analysis": { "penalty_risk": "...", "other_risks": [ { "name": "...", "detail": "..." } ] }
}

Rules:
- Return JSON only.
- A field absent from this chunk becomes an empty string or empty list.
- Append page numbers in parentheses inside values, using the [PAGE:n] markers."#;

const AGGREGATE_PROMPT: &str = r#"You are given several JSON Tender Summary objects, each extracted from one chunk of the same document. Merge them into ONE consolidated object with the same keys:

{
  "project_overview": "...",
  "eligibility_highlights": [...],
  "important_dates": { "pre_bid_queries": "...", "bid_submission": "...", "other_dates": [...] },
  "financial_requirements": { "contract_value": "...", "document_fees": "..." },
  "risk_analysis": { "penalty_risk": "...", "other_risks": [...] }
}

Rules:
- Prefer the most complete non-empty value for each scalar field and keep its page provenance.
- Keep at most 4 eligibility_highlights, deduplicated case-insensitively.
- Merge other_dates and other_risks, dropping exact duplicates.
- Do not invent values absent from every input.
- Return one valid JSON object and nothing else."#;

/// One-pager tender summary: overview, eligibility, dates, financials and
/// risk flags.
pub struct SummaryTask;

/// Appends " (pages X-Y)" unless the value is empty or already carries a
/// page reference from the model.
fn append_page_range(value: &mut String, chunk: &PageChunk) {
    if value.is_empty() || value.to_lowercase().contains("page") {
        return;
    }
    value.push_str(&format!(" (pages {}-{})", chunk.start_page, chunk.end_page));
}

impl ExtractionTask for SummaryTask {
    type Output = TenderSummary;

    fn name(&self) -> &'static str {
        "tender_summary"
    }

    fn single_prompt(&self, document_text: &str) -> String {
        format!("{SINGLE_PROMPT}\n\nDOCUMENT:\n{document_text}")
    }

    fn chunk_prompt(&self, chunk: &PageChunk) -> String {
        format!("{CHUNK_PROMPT}\n\nDOCUMENT CHUNK:\n{}", chunk.text)
    }

    fn aggregate_prompt(&self, partials_json: &str) -> String {
        format!("{AGGREGATE_PROMPT}\n\nChunk-level JSON objects:\n{partials_json}")
    }

    fn stamp_provenance(&self, value: &mut TenderSummary, chunk: &PageChunk) {
        append_page_range(&mut value.project_overview, chunk);
        append_page_range(&mut value.important_dates.pre_bid_queries, chunk);
        append_page_range(&mut value.important_dates.bid_submission, chunk);
        for entry in &mut value.important_dates.other_dates {
            append_page_range(&mut entry.date, chunk);
        }
    }
}
