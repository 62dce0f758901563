mod chat_client;
mod gemini_backend;

pub use chat_client::OpenAiChatClient;
pub use gemini_backend::GeminiBackend;
