use std::time::Duration;

use config::{Config, ConfigError, Environment as EnvironmentSource, File};
use serde::Deserialize;

use crate::application::extraction::PipelineConfig;
use crate::application::ports::CompletionOptions;

use super::Environment;

/// Application settings, layered from an optional `appsettings.{env}` file
/// and `APP_`-prefixed environment variables. Every field has a working
/// default, so the server starts with nothing but credentials configured.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    pub chat: ChatSettings,
    pub pipeline: PipelineSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8082,
        }
    }
}

/// Completion backend connection and model selection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    pub base_url: String,
    pub api_key: String,
    pub primary_model: String,
    pub secondary_model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: String::new(),
            primary_model: "gemini-2.5-pro".to_string(),
            secondary_model: "gemini-2.5-flash".to_string(),
            temperature: 0.1,
            max_output_tokens: 8192,
        }
    }
}

/// Assistant chat backend (OpenAI-compatible).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-3.5-turbo".to_string(),
        }
    }
}

/// Extraction cascade tunables. Durations are split into integer fields so
/// they can come from environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub pages_per_chunk: usize,
    pub overlap_pages: usize,
    pub max_retries: u32,
    pub call_timeout_secs: u64,
    pub chunk_throttle_ms: u64,
    pub max_consecutive_failures: u32,
    pub backoff_base_ms: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            pages_per_chunk: 6,
            overlap_pages: 1,
            max_retries: 2,
            call_timeout_secs: 45,
            chunk_throttle_ms: 200,
            max_consecutive_failures: 6,
            backoff_base_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub json: bool,
}

impl Settings {
    /// Loads settings for the given environment. A missing appsettings
    /// file is fine; defaults and environment variables cover everything.
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        let configuration = Config::builder()
            .add_source(
                File::with_name(&format!("appsettings.{}", environment.as_str())).required(false),
            )
            .add_source(EnvironmentSource::with_prefix("APP").separator("__"))
            .build()?;

        configuration.try_deserialize()
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            primary_model: self.backend.primary_model.clone(),
            secondary_model: self.backend.secondary_model.clone(),
            pages_per_chunk: self.pipeline.pages_per_chunk,
            overlap_pages: self.pipeline.overlap_pages,
            max_retries: self.pipeline.max_retries,
            call_timeout: Duration::from_secs(self.pipeline.call_timeout_secs),
            chunk_throttle: Duration::from_millis(self.pipeline.chunk_throttle_ms),
            max_consecutive_failures: self.pipeline.max_consecutive_failures,
            backoff_base: Duration::from_millis(self.pipeline.backoff_base_ms),
            options: CompletionOptions {
                temperature: self.backend.temperature,
                max_output_tokens: self.backend.max_output_tokens,
            },
        }
    }
}
