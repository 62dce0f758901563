use async_trait::async_trait;

/// Conversational completion used by the chat relay; separate from
/// [`super::CompletionBackend`] because it carries its own system prompt and
/// a different provider surface.
#[async_trait]
pub trait ChatResponder: Send + Sync {
    async fn respond(&self, message: &str) -> Result<String, ChatError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("chat backend is not configured")]
    NotConfigured,
    #[error("chat request failed: {0}")]
    RequestFailed(String),
}
