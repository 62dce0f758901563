use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tendersift::application::extraction::tasks::{SectionTask, SummaryTask};
use tendersift::application::extraction::{
    ChunkRunState, ExtractionPipeline, PipelineConfig, PipelineError, PipelineMode,
};
use tendersift::application::ports::{CompletionBackend, CompletionError, CompletionOptions};

const PRIMARY: &str = "gemini-2.5-pro";
const SECONDARY: &str = "gemini-2.5-flash";

/// Replays a scripted sequence of completion results and records every
/// call. Once the script runs out, further calls fail with `Empty`.
struct ScriptedBackend {
    responses: Mutex<VecDeque<Result<String, CompletionError>>>,
    calls: Mutex<Vec<(String, String)>>,
    configured: bool,
}

impl ScriptedBackend {
    fn new(responses: Vec<Result<String, CompletionError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
            configured: true,
        }
    }

    fn unconfigured() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            configured: false,
        }
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn call(&self, index: usize) -> (String, String) {
        self.calls.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(
        &self,
        prompt: &str,
        model: &str,
        _options: CompletionOptions,
    ) -> Result<String, CompletionError> {
        self.calls
            .lock()
            .unwrap()
            .push((model.to_string(), prompt.to_string()));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CompletionError::Empty))
    }

    fn is_configured(&self) -> bool {
        self.configured
    }
}

/// Sleeps past the pipeline's call timeout on every call.
struct SlowBackend {
    calls: AtomicUsize,
}

#[async_trait]
impl CompletionBackend for SlowBackend {
    async fn complete(
        &self,
        _prompt: &str,
        _model: &str,
        _options: CompletionOptions,
    ) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(200)).await;
        Ok("too late".to_string())
    }

    fn is_configured(&self) -> bool {
        true
    }
}

fn test_config() -> PipelineConfig {
    PipelineConfig {
        pages_per_chunk: 2,
        overlap_pages: 0,
        max_retries: 1,
        chunk_throttle: Duration::ZERO,
        max_consecutive_failures: 2,
        backoff_base: Duration::ZERO,
        ..PipelineConfig::default()
    }
}

fn pages(count: usize) -> Vec<String> {
    (1..=count)
        .map(|n| format!("page {n} plain prose body"))
        .collect()
}

fn section_json(name: &str) -> String {
    format!(
        r#"[{{"section_name": "{name}", "section_summary": "summary of {name}", "key_considerations": []}}]"#
    )
}

fn ok_section(name: &str) -> Result<String, CompletionError> {
    Ok(section_json(name))
}

fn err_empty() -> Result<String, CompletionError> {
    Err(CompletionError::Empty)
}

fn pipeline(backend: Arc<ScriptedBackend>, config: PipelineConfig) -> ExtractionPipeline<ScriptedBackend> {
    ExtractionPipeline::new(backend, config)
}

#[tokio::test]
async fn given_primary_single_call_succeeds_then_mode_is_single_primary() {
    let backend = Arc::new(ScriptedBackend::new(vec![ok_section("Scope")]));
    let p = pipeline(Arc::clone(&backend), test_config());

    let outcome = p.run(&SectionTask, &pages(3)).await.unwrap();

    assert_eq!(outcome.mode, PipelineMode::SinglePrimary);
    assert_eq!(outcome.final_value.sections()[0].section_name, "Scope");
    assert!(outcome.raw_single.is_some());
    assert!(outcome.processed_chunks.is_none());
    assert_eq!(backend.call_count(), 1);

    let (model, prompt) = backend.call(0);
    assert_eq!(model, PRIMARY);
    assert!(prompt.contains("[PAGE:1]"));
    assert!(prompt.contains("[PAGE:3]"));
}

#[tokio::test]
async fn given_primary_fails_and_secondary_succeeds_then_mode_is_single_secondary() {
    let backend = Arc::new(ScriptedBackend::new(vec![
        Err(CompletionError::Transport("HTTP 500: boom".to_string())),
        ok_section("Scope"),
    ]));
    let p = pipeline(Arc::clone(&backend), test_config());

    let outcome = p.run(&SectionTask, &pages(3)).await.unwrap();

    assert_eq!(outcome.mode, PipelineMode::SingleSecondary);
    assert_eq!(backend.call_count(), 2);
    assert_eq!(backend.call(1).0, SECONDARY);
}

#[tokio::test]
async fn given_unparseable_primary_response_then_secondary_is_tried() {
    let backend = Arc::new(ScriptedBackend::new(vec![
        Ok("I could not find any sections, sorry.".to_string()),
        ok_section("Scope"),
    ]));
    let p = pipeline(Arc::clone(&backend), test_config());

    let outcome = p.run(&SectionTask, &pages(3)).await.unwrap();

    assert_eq!(outcome.mode, PipelineMode::SingleSecondary);
    assert_eq!(backend.call_count(), 2);
}

#[tokio::test]
async fn given_empty_value_from_primary_then_treated_as_failure() {
    let backend = Arc::new(ScriptedBackend::new(vec![
        Ok("[]".to_string()),
        ok_section("Scope"),
    ]));
    let p = pipeline(Arc::clone(&backend), test_config());

    let outcome = p.run(&SectionTask, &pages(3)).await.unwrap();

    assert_eq!(outcome.mode, PipelineMode::SingleSecondary);
}

#[tokio::test]
async fn given_singles_fail_and_chunks_succeed_then_model_aggregation_runs() {
    let backend = Arc::new(ScriptedBackend::new(vec![
        err_empty(),
        err_empty(),
        ok_section("Scope A"),
        ok_section("Scope B"),
        ok_section("Merged"),
    ]));
    let p = pipeline(Arc::clone(&backend), test_config());

    let outcome = p.run(&SectionTask, &pages(4)).await.unwrap();

    assert_eq!(outcome.mode, PipelineMode::ChunkModelAggregate);
    assert_eq!(outcome.final_value.sections()[0].section_name, "Merged");
    assert_eq!(outcome.processed_chunks, Some(2));
    assert_eq!(backend.call_count(), 5);

    // Chunk calls go to the secondary model with that chunk's pages only.
    let (model, prompt) = backend.call(2);
    assert_eq!(model, SECONDARY);
    assert!(prompt.contains("[PAGE:1]"));
    assert!(!prompt.contains("[PAGE:3]"));
    assert!(backend.call(3).1.contains("[PAGE:3]"));

    // Aggregation goes back to the primary model with the partials inline.
    let (model, prompt) = backend.call(4);
    assert_eq!(model, PRIMARY);
    assert!(prompt.contains("Scope A"));
    assert!(prompt.contains("Scope B"));
}

#[tokio::test]
async fn given_model_aggregation_fails_then_programmatic_merge_is_used() {
    let backend = Arc::new(ScriptedBackend::new(vec![
        err_empty(),
        err_empty(),
        ok_section("Scope A"),
        ok_section("Scope B"),
        Ok("nonsense".to_string()),
    ]));
    let p = pipeline(Arc::clone(&backend), test_config());

    let outcome = p.run(&SectionTask, &pages(4)).await.unwrap();

    assert_eq!(outcome.mode, PipelineMode::ChunkProgrammaticAggregate);
    let names: Vec<&str> = outcome
        .final_value
        .sections()
        .iter()
        .map(|s| s.section_name.as_str())
        .collect();
    assert_eq!(names, vec!["Scope A", "Scope B"]);
    assert_eq!(outcome.processed_chunks, Some(2));
    assert_eq!(backend.call_count(), 5);
}

#[tokio::test]
async fn given_unparseable_chunk_response_then_chunk_is_retried() {
    let backend = Arc::new(ScriptedBackend::new(vec![
        err_empty(),
        err_empty(),
        Ok("not json".to_string()),
        ok_section("Scope A"),
        ok_section("Merged"),
    ]));
    let p = pipeline(Arc::clone(&backend), test_config());

    let outcome = p.run(&SectionTask, &pages(2)).await.unwrap();

    assert_eq!(outcome.mode, PipelineMode::ChunkModelAggregate);
    assert_eq!(outcome.processed_chunks, Some(1));
    assert_eq!(backend.call_count(), 5);
}

#[tokio::test]
async fn given_truncated_chunk_response_then_chunk_is_not_retried() {
    let config = PipelineConfig {
        max_retries: 2,
        ..test_config()
    };
    let backend = Arc::new(ScriptedBackend::new(vec![
        err_empty(),
        err_empty(),
        Err(CompletionError::Truncated),
    ]));
    let p = pipeline(Arc::clone(&backend), config);

    let outcome = p.run(&SectionTask, &pages(2)).await.unwrap();

    assert_eq!(outcome.mode, PipelineMode::ChunkFailed);
    assert!(outcome.final_value.sections().is_empty());
    assert_eq!(outcome.processed_chunks, Some(1));
    // Two single attempts plus exactly one chunk attempt.
    assert_eq!(backend.call_count(), 3);
}

#[tokio::test]
async fn given_consecutive_chunk_failures_then_remaining_chunks_abandoned() {
    let config = PipelineConfig {
        max_retries: 0,
        max_consecutive_failures: 2,
        ..test_config()
    };
    let backend = Arc::new(ScriptedBackend::new(vec![
        err_empty(),
        err_empty(),
        err_empty(),
        err_empty(),
    ]));
    let p = pipeline(Arc::clone(&backend), config);

    let outcome = p.run(&SectionTask, &pages(8)).await.unwrap();

    assert_eq!(outcome.mode, PipelineMode::ChunkFailed);
    // Four chunks existed but only two were attempted before the stop.
    assert_eq!(outcome.processed_chunks, Some(2));
    assert_eq!(backend.call_count(), 4);
}

#[tokio::test]
async fn given_six_consecutive_failures_mid_document_then_tail_chunk_never_attempted() {
    let config = PipelineConfig {
        max_retries: 0,
        max_consecutive_failures: 6,
        ..test_config()
    };
    let mut script = vec![err_empty(), err_empty()];
    script.push(ok_section("Scope A"));
    script.push(ok_section("Scope B"));
    script.push(ok_section("Scope C"));
    script.extend((0..6).map(|_| err_empty()));
    let backend = Arc::new(ScriptedBackend::new(script));
    let p = pipeline(Arc::clone(&backend), config);

    // 20 pages at 2 per chunk with no overlap make 10 chunks.
    let outcome = p.run(&SectionTask, &pages(20)).await.unwrap();

    assert_eq!(outcome.mode, PipelineMode::ChunkProgrammaticAggregate);
    assert_eq!(outcome.final_value.sections().len(), 3);
    // Chunks 1-3 succeeded, 4-9 failed, chunk 10 was abandoned.
    assert_eq!(outcome.processed_chunks, Some(9));
    // Two singles, nine chunk attempts, one aggregation attempt.
    assert_eq!(backend.call_count(), 12);
}

#[tokio::test]
async fn given_a_chunk_success_then_failure_streak_resets() {
    let config = PipelineConfig {
        max_retries: 0,
        max_consecutive_failures: 2,
        ..test_config()
    };
    let backend = Arc::new(ScriptedBackend::new(vec![
        err_empty(),
        err_empty(),
        err_empty(),
        ok_section("Scope A"),
        err_empty(),
        ok_section("Scope B"),
        err_empty(),
    ]));
    let p = pipeline(Arc::clone(&backend), config);

    let outcome = p.run(&SectionTask, &pages(8)).await.unwrap();

    assert_eq!(outcome.mode, PipelineMode::ChunkProgrammaticAggregate);
    assert_eq!(outcome.final_value.sections().len(), 2);
    assert_eq!(outcome.processed_chunks, Some(4));
    assert_eq!(backend.call_count(), 7);
}

#[tokio::test]
async fn given_no_pages_then_chunk_failed_without_any_backend_call() {
    let backend = Arc::new(ScriptedBackend::new(vec![]));
    let p = pipeline(Arc::clone(&backend), test_config());

    let outcome = p.run(&SectionTask, &[]).await.unwrap();

    assert_eq!(outcome.mode, PipelineMode::ChunkFailed);
    assert!(outcome.final_value.sections().is_empty());
    assert_eq!(outcome.processed_chunks, Some(0));
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn given_unconfigured_backend_then_run_fails_before_any_call() {
    let backend = Arc::new(ScriptedBackend::unconfigured());
    let p = pipeline(Arc::clone(&backend), test_config());

    let result = p.run(&SectionTask, &pages(2)).await;

    assert!(matches!(result, Err(PipelineError::BackendNotConfigured)));
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn given_slow_backend_then_calls_time_out_and_cascade_degrades() {
    let config = PipelineConfig {
        max_retries: 0,
        call_timeout: Duration::from_millis(10),
        ..test_config()
    };
    let backend = Arc::new(SlowBackend {
        calls: AtomicUsize::new(0),
    });
    let p = ExtractionPipeline::new(Arc::clone(&backend), config);

    let outcome = p.run(&SectionTask, &pages(2)).await.unwrap();

    assert_eq!(outcome.mode, PipelineMode::ChunkFailed);
    // Two single attempts and one chunk attempt, all timed out.
    assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn given_chunked_summary_then_values_are_stamped_with_page_ranges() {
    let summary_json = r#"{
        "project_overview": "Road upgrade",
        "important_dates": {
            "pre_bid_queries": "10 Jan 2025",
            "bid_submission": "see page 12",
            "other_dates": [{"name": "Site visit", "date": "1 Feb 2025"}]
        }
    }"#;
    let config = PipelineConfig {
        max_retries: 0,
        ..test_config()
    };
    let backend = Arc::new(ScriptedBackend::new(vec![
        err_empty(),
        err_empty(),
        Ok(summary_json.to_string()),
        err_empty(),
    ]));
    let p = pipeline(Arc::clone(&backend), config);

    let outcome = p.run(&SummaryTask, &pages(2)).await.unwrap();

    assert_eq!(outcome.mode, PipelineMode::ChunkProgrammaticAggregate);
    let summary = &outcome.final_value;
    assert_eq!(summary.project_overview, "Road upgrade (pages 1-2)");
    assert_eq!(summary.important_dates.pre_bid_queries, "10 Jan 2025 (pages 1-2)");
    // Values that already cite a page are left alone.
    assert_eq!(summary.important_dates.bid_submission, "see page 12");
    assert_eq!(
        summary.important_dates.other_dates[0].date,
        "1 Feb 2025 (pages 1-2)"
    );
}

#[test]
fn given_pipeline_modes_when_serializing_then_wire_names_are_stable() {
    assert_eq!(
        serde_json::to_value(PipelineMode::SinglePrimary).unwrap(),
        json!("single_primary")
    );
    assert_eq!(
        serde_json::to_value(PipelineMode::SingleSecondary).unwrap(),
        json!("single_secondary")
    );
    assert_eq!(
        serde_json::to_value(PipelineMode::ChunkModelAggregate).unwrap(),
        json!("chunk_model_aggregate")
    );
    assert_eq!(
        serde_json::to_value(PipelineMode::ChunkProgrammaticAggregate).unwrap(),
        json!("chunk_programmatic_aggregate")
    );
    assert_eq!(
        serde_json::to_value(PipelineMode::ChunkFailed).unwrap(),
        json!("chunk_failed")
    );
}

#[tokio::test]
async fn given_successful_outcome_when_serializing_then_final_key_present() {
    let backend = Arc::new(ScriptedBackend::new(vec![ok_section("Scope")]));
    let p = pipeline(Arc::clone(&backend), test_config());

    let outcome = p.run(&SectionTask, &pages(2)).await.unwrap();
    let value = serde_json::to_value(&outcome).unwrap();

    assert_eq!(value["mode"], json!("single_primary"));
    assert!(value["final"].is_array());
    assert!(value["raw_single"].is_string());
    assert!(value.get("processed_chunks").is_none());
}

#[tokio::test]
async fn given_failed_outcome_when_serializing_then_final_is_empty_value() {
    let backend = Arc::new(ScriptedBackend::new(vec![]));
    let p = pipeline(Arc::clone(&backend), test_config());

    let outcome = p.run(&SectionTask, &pages(2)).await.unwrap();
    let value = serde_json::to_value(&outcome).unwrap();

    assert_eq!(value["mode"], json!("chunk_failed"));
    assert_eq!(value["final"], json!([]));
    assert!(value.get("raw_single").is_none());
    assert_eq!(value["processed_chunks"], json!(1));
}

#[test]
fn given_repeated_page_range_when_marking_processed_then_second_time_rejected() {
    let mut state = ChunkRunState::new();

    assert!(state.mark_processed("1-6"));
    assert!(!state.mark_processed("1-6"));
    assert!(state.mark_processed("6-11"));
}

#[test]
fn given_failures_then_success_when_recording_then_streak_resets() {
    let mut state = ChunkRunState::new();

    assert_eq!(state.record_failure(), 1);
    assert_eq!(state.record_failure(), 2);
    state.record_success();
    assert_eq!(state.consecutive_failures(), 0);
    assert_eq!(state.record_failure(), 1);
}

#[test]
fn given_attempts_when_recording_then_counted() {
    let mut state = ChunkRunState::new();

    state.record_attempt();
    state.record_attempt();
    assert_eq!(state.attempted(), 2);
}
