use crate::domain::PageChunk;
use crate::domain::schemas::ExtractionValue;

/// One extraction target (section report, tender summary, scope of work).
/// A task owns its prompts and output schema; the pipeline owns the call
/// strategy, retries and aggregation. Adding a new extraction means adding
/// a new task, not touching the pipeline.
pub trait ExtractionTask: Send + Sync {
    type Output: ExtractionValue;

    /// Short task name used in logs and traces.
    fn name(&self) -> &'static str;

    /// Prompt for a whole-document call.
    fn single_prompt(&self, document_text: &str) -> String;

    /// Prompt for one page chunk.
    fn chunk_prompt(&self, chunk: &PageChunk) -> String;

    /// Prompt that asks the model to merge per-chunk results, given the
    /// partials serialized as a JSON array.
    fn aggregate_prompt(&self, partials_json: &str) -> String;

    /// Annotates a per-chunk result with the page range it came from, so
    /// provenance survives aggregation. Default is a no-op for tasks whose
    /// schema has no free-text fields worth stamping.
    fn stamp_provenance(&self, _value: &mut Self::Output, _chunk: &PageChunk) {}
}
