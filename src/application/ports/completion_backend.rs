use std::time::Duration;

use async_trait::async_trait;

/// Sampling parameters for one completion call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_output_tokens: 8192,
        }
    }
}

/// A stateless text-completion service.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// One completion call against the named model. Implementations decide
    /// the failure kind here, at the call boundary; callers never re-derive
    /// it from message text.
    async fn complete(
        &self,
        prompt: &str,
        model: &str,
        options: CompletionOptions,
    ) -> Result<String, CompletionError>;

    /// False when required credentials are missing. Checked once per
    /// extraction request, before any cascade step runs.
    fn is_configured(&self) -> bool;
}

/// Why a completion call produced no usable text.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("completion backend is not configured")]
    NotConfigured,
    #[error("completion call timed out after {0:?}")]
    Timeout(Duration),
    #[error("completion response contained no content")]
    Empty,
    #[error("completion output was truncated at the token limit")]
    Truncated,
    #[error("completion transport failed: {0}")]
    Transport(String),
}
