//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod data;
mod evaluation;
mod output;
mod providers;

pub use data::FileDataConfig;
pub use evaluation::FileEvaluationConfig;
pub use output::{FileOutputConfig, FileOutputFormat};
pub use providers::{FileAnthropicConfig, FileOpenAiConfig, FileProvidersConfig};

use navigator_domain::EvaluationReport;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("evaluation.models: model name cannot be empty")]
    EmptyModelName,

    #[error("evaluation.models: `{0}` is a reserved key of the evaluation document")]
    ReservedModelId(String),

    #[error("evaluation.{0} must be at least 1")]
    ZeroValue(&'static str),

    #[error("evaluation.timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("{field}: unknown provider `{value}` (expected anthropic, openai or gemini)")]
    UnknownProvider { field: String, value: String },
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Models and run control
    pub evaluation: FileEvaluationConfig,
    /// Profile keyword data
    pub data: FileDataConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Provider credentials, endpoints and routing
    pub providers: FileProvidersConfig,
}

impl FileConfig {
    /// Validate the configuration, returning the first problem found.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let evaluation = &self.evaluation;
        for model in &evaluation.models {
            if model.trim().is_empty() {
                return Err(ConfigValidationError::EmptyModelName);
            }
            if EvaluationReport::check_model_id(model).is_err() {
                return Err(ConfigValidationError::ReservedModelId(model.clone()));
            }
        }
        if evaluation.chunk_size == 0 {
            return Err(ConfigValidationError::ZeroValue("chunk_size"));
        }
        if evaluation.min_successful_chunks == 0 {
            return Err(ConfigValidationError::ZeroValue("min_successful_chunks"));
        }
        if evaluation.chunk_prompt_budget == 0 {
            return Err(ConfigValidationError::ZeroValue("chunk_prompt_budget"));
        }
        if evaluation.final_prompt_budget == 0 {
            return Err(ConfigValidationError::ZeroValue("final_prompt_budget"));
        }
        if evaluation.timeout_seconds == Some(0) {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        self.providers.to_provider_config()?;
        Ok(())
    }
}
