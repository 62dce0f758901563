mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    BackendSettings, ChatSettings, LoggingSettings, PipelineSettings, ServerSettings, Settings,
};
