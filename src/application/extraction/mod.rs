pub mod candidate_filter;
pub mod pipeline;
pub mod sanitizer;
pub mod segmenter;
mod task;
pub mod tasks;

pub use pipeline::{
    ChunkRunState, ExtractionPipeline, PipelineConfig, PipelineError, PipelineMode,
    PipelineOutcome,
};
pub use task::ExtractionTask;
