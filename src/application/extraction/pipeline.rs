use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::ports::{CompletionBackend, CompletionError, CompletionOptions};
use crate::domain::PageChunk;
use crate::domain::schemas::ExtractionValue;

use super::candidate_filter::filter_candidates;
use super::sanitizer::salvage_parse;
use super::segmenter::{make_chunks, render_pages};
use super::task::ExtractionTask;

/// Tunables for the extraction cascade. Defaults mirror production
/// settings; tests zero the delays to keep runs fast.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub primary_model: String,
    pub secondary_model: String,
    pub pages_per_chunk: usize,
    pub overlap_pages: usize,
    /// Extra attempts per chunk after the first.
    pub max_retries: u32,
    /// Per-attempt bound on one completion call.
    pub call_timeout: Duration,
    /// Pause between chunk calls to stay under backend rate limits.
    pub chunk_throttle: Duration,
    /// Consecutive failed chunks before the rest of the document is
    /// abandoned.
    pub max_consecutive_failures: u32,
    /// Base unit of the quadratic retry backoff.
    pub backoff_base: Duration,
    pub options: CompletionOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            primary_model: "gemini-2.5-pro".to_string(),
            secondary_model: "gemini-2.5-flash".to_string(),
            pages_per_chunk: 6,
            overlap_pages: 1,
            max_retries: 2,
            call_timeout: Duration::from_secs(45),
            chunk_throttle: Duration::from_millis(200),
            max_consecutive_failures: 6,
            backoff_base: Duration::from_millis(500),
            options: CompletionOptions::default(),
        }
    }
}

/// How the final value was produced, ordered from most to least direct.
/// Clients read this to judge how much confidence to place in the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineMode {
    SinglePrimary,
    SingleSecondary,
    ChunkModelAggregate,
    ChunkProgrammaticAggregate,
    ChunkFailed,
}

impl fmt::Display for PipelineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineMode::SinglePrimary => "single_primary",
            PipelineMode::SingleSecondary => "single_secondary",
            PipelineMode::ChunkModelAggregate => "chunk_model_aggregate",
            PipelineMode::ChunkProgrammaticAggregate => "chunk_programmatic_aggregate",
            PipelineMode::ChunkFailed => "chunk_failed",
        };
        f.write_str(name)
    }
}

/// Result of one extraction run. `final` is always present and well-typed;
/// in the degenerate case it is the schema's empty value with
/// `mode = chunk_failed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutcome<T> {
    pub mode: PipelineMode,
    #[serde(rename = "final")]
    pub final_value: T,
    /// Raw model text from a successful single-document call, for clients
    /// that want to re-parse or audit it. Absent in chunked modes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_single: Option<String>,
    /// Chunks actually attempted against the backend. Absent in single
    /// modes; excludes duplicate-range skips and the early-stopped tail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_chunks: Option<usize>,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("no completion backend is configured")]
    BackendNotConfigured,
}

/// Per-run bookkeeping for the chunk loop: duplicate page-range guard,
/// consecutive-failure counter and attempted-call count.
#[derive(Debug, Default)]
pub struct ChunkRunState {
    processed_ranges: HashSet<String>,
    consecutive_failures: u32,
    attempted: usize,
}

impl ChunkRunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a page range as processed. Returns false when the range was
    /// already seen, in which case the caller skips the chunk without a
    /// backend call.
    pub fn mark_processed(&mut self, page_range: &str) -> bool {
        self.processed_ranges.insert(page_range.to_string())
    }

    pub fn record_attempt(&mut self) {
        self.attempted += 1;
    }

    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
    }

    /// Increments the consecutive-failure counter and returns its new value.
    pub fn record_failure(&mut self) -> u32 {
        self.consecutive_failures += 1;
        self.consecutive_failures
    }

    pub fn attempted(&self) -> usize {
        self.attempted
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}

/// Extraction cascade over an unreliable completion backend: one call for
/// the whole document on the primary model, the same on the secondary
/// model, then per-chunk calls with retry and aggregation. Every stage
/// degrades to the next; the only hard failure is a missing backend.
pub struct ExtractionPipeline<B> {
    backend: Arc<B>,
    config: PipelineConfig,
}

impl<B> ExtractionPipeline<B>
where
    B: CompletionBackend,
{
    pub fn new(backend: Arc<B>, config: PipelineConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    #[tracing::instrument(skip(self, task, pages), fields(task = task.name(), pages = pages.len()))]
    pub async fn run<T>(
        &self,
        task: &T,
        pages: &[String],
    ) -> Result<PipelineOutcome<T::Output>, PipelineError>
    where
        T: ExtractionTask,
    {
        if !self.backend.is_configured() {
            return Err(PipelineError::BackendNotConfigured);
        }

        if !pages.is_empty() {
            let document_text = render_pages(pages, 1);

            if let Some((value, raw)) = self
                .try_single(task, &document_text, &self.config.primary_model)
                .await
            {
                tracing::info!(task = task.name(), "Single-call extraction succeeded on primary model");
                return Ok(PipelineOutcome {
                    mode: PipelineMode::SinglePrimary,
                    final_value: value,
                    raw_single: Some(raw),
                    processed_chunks: None,
                });
            }

            if let Some((value, raw)) = self
                .try_single(task, &document_text, &self.config.secondary_model)
                .await
            {
                tracing::info!(task = task.name(), "Single-call extraction succeeded on secondary model");
                return Ok(PipelineOutcome {
                    mode: PipelineMode::SingleSecondary,
                    final_value: value,
                    raw_single: Some(raw),
                    processed_chunks: None,
                });
            }

            tracing::warn!(task = task.name(), "Both single-call attempts failed; falling back to chunked extraction");
        }

        let (partials, attempted) = self.run_chunked(task, pages).await;

        if partials.is_empty() {
            tracing::warn!(task = task.name(), attempted, "No chunk produced a usable value");
            return Ok(PipelineOutcome {
                mode: PipelineMode::ChunkFailed,
                final_value: T::Output::empty(),
                raw_single: None,
                processed_chunks: Some(attempted),
            });
        }

        if let Some(value) = self.try_model_aggregate(task, &partials).await {
            tracing::info!(task = task.name(), partials = partials.len(), "Model aggregation succeeded");
            return Ok(PipelineOutcome {
                mode: PipelineMode::ChunkModelAggregate,
                final_value: value,
                raw_single: None,
                processed_chunks: Some(attempted),
            });
        }

        tracing::info!(task = task.name(), partials = partials.len(), "Falling back to programmatic aggregation");
        Ok(PipelineOutcome {
            mode: PipelineMode::ChunkProgrammaticAggregate,
            final_value: T::Output::merge(partials),
            raw_single: None,
            processed_chunks: Some(attempted),
        })
    }

    /// One whole-document call. Returns the parsed value with the raw
    /// response text, or `None` on any failure so the cascade moves on.
    async fn try_single<T>(
        &self,
        task: &T,
        document_text: &str,
        model: &str,
    ) -> Option<(T::Output, String)>
    where
        T: ExtractionTask,
    {
        let prompt = task.single_prompt(document_text);
        match self.call_backend(&prompt, model).await {
            Ok(text) => match salvage_parse::<T::Output>(&text) {
                Some(value) if !value.is_empty() => Some((value, text)),
                _ => {
                    tracing::warn!(task = task.name(), model, "Single-call response did not parse to a usable value");
                    None
                }
            },
            Err(error) => {
                tracing::warn!(task = task.name(), model, error = %error, "Single-call completion failed");
                None
            }
        }
    }

    /// Segments and filters the document, then extracts each chunk with
    /// retries. Returns the collected partials and the number of chunks
    /// attempted against the backend.
    async fn run_chunked<T>(&self, task: &T, pages: &[String]) -> (Vec<T::Output>, usize)
    where
        T: ExtractionTask,
    {
        let chunks = make_chunks(pages, self.config.pages_per_chunk, self.config.overlap_pages);
        let total_chunks = chunks.len();
        let chunks = filter_candidates(chunks);
        tracing::info!(
            task = task.name(),
            candidates = chunks.len(),
            dropped_by_filter = total_chunks - chunks.len(),
            "Chunked extraction started"
        );

        let mut state = ChunkRunState::new();
        let mut partials: Vec<T::Output> = Vec::new();
        let total = chunks.len();

        for (index, chunk) in chunks.iter().enumerate() {
            if !state.mark_processed(&chunk.page_range()) {
                tracing::debug!(page_range = %chunk.page_range(), "Duplicate page range skipped");
                continue;
            }

            state.record_attempt();
            match self.extract_chunk(task, chunk).await {
                Some(mut value) => {
                    task.stamp_provenance(&mut value, chunk);
                    partials.push(value);
                    state.record_success();
                }
                None => {
                    let failures = state.record_failure();
                    if failures >= self.config.max_consecutive_failures {
                        tracing::warn!(
                            task = task.name(),
                            consecutive_failures = failures,
                            abandoned = total - index - 1,
                            "Too many consecutive chunk failures; abandoning remaining chunks"
                        );
                        break;
                    }
                }
            }

            if index + 1 < total && !self.config.chunk_throttle.is_zero() {
                tokio::time::sleep(self.config.chunk_throttle).await;
            }
        }

        (partials, state.attempted())
    }

    /// Extracts one chunk with up to `max_retries + 1` attempts and a
    /// quadratic backoff between them. Truncation is terminal for the
    /// chunk: the same prompt would truncate again at the same token limit.
    async fn extract_chunk<T>(&self, task: &T, chunk: &PageChunk) -> Option<T::Output>
    where
        T: ExtractionTask,
    {
        let prompt = task.chunk_prompt(chunk);
        let attempts = self.config.max_retries + 1;

        for attempt in 1..=attempts {
            if attempt > 1 {
                let delay = self.config.backoff_base * (attempt - 1).pow(2);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }

            match self.call_backend(&prompt, &self.config.secondary_model).await {
                Ok(text) => {
                    if let Some(value) = salvage_parse::<T::Output>(&text) {
                        if !value.is_empty() {
                            return Some(value);
                        }
                    }
                    tracing::warn!(
                        page_range = %chunk.page_range(),
                        attempt,
                        "Chunk response did not parse to a usable value"
                    );
                }
                Err(CompletionError::Truncated) => {
                    tracing::warn!(
                        page_range = %chunk.page_range(),
                        attempt,
                        "Chunk response truncated at the token limit; not retrying"
                    );
                    return None;
                }
                Err(error) => {
                    tracing::warn!(
                        page_range = %chunk.page_range(),
                        attempt,
                        error = %error,
                        "Chunk completion failed"
                    );
                }
            }
        }

        None
    }

    /// Asks the primary model to merge the partials. Any failure returns
    /// `None` so the caller falls back to the programmatic merge.
    async fn try_model_aggregate<T>(&self, task: &T, partials: &[T::Output]) -> Option<T::Output>
    where
        T: ExtractionTask,
    {
        let partials_json = match serde_json::to_string(partials) {
            Ok(json) => json,
            Err(error) => {
                tracing::warn!(task = task.name(), error = %error, "Failed to serialize partials for model aggregation");
                return None;
            }
        };

        let prompt = task.aggregate_prompt(&partials_json);
        match self.call_backend(&prompt, &self.config.primary_model).await {
            Ok(text) => match salvage_parse::<T::Output>(&text) {
                Some(value) if !value.is_empty() => Some(value),
                _ => {
                    tracing::warn!(task = task.name(), "Model aggregation response did not parse to a usable value");
                    None
                }
            },
            Err(error) => {
                tracing::warn!(task = task.name(), error = %error, "Model aggregation call failed");
                None
            }
        }
    }

    /// Single choke point for backend calls: applies the per-attempt
    /// timeout and turns its expiry into a tagged failure.
    async fn call_backend(&self, prompt: &str, model: &str) -> Result<String, CompletionError> {
        let timeout = self.config.call_timeout;
        match tokio::time::timeout(
            timeout,
            self.backend.complete(prompt, model, self.config.options),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(CompletionError::Timeout(timeout)),
        }
    }
}
