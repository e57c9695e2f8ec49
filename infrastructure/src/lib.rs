//! Infrastructure layer for keyword-navigator
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: provider clients, configuration loading,
//! file stores and the call log.

pub mod config;
pub mod logging;
pub mod providers;
pub mod storage;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileDataConfig, FileEvaluationConfig,
    FileOutputConfig, FileOutputFormat, FileProvidersConfig,
};
pub use logging::JsonlCallLogger;
pub use providers::{
    ProviderAdapter, anthropic::AnthropicAdapter, openai_compat::OpenAiCompatibleAdapter,
    routing::RoutingGateway,
};
pub use storage::{JsonProfileStore, JsonReportStore};
