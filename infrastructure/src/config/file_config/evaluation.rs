//! Evaluation configuration from TOML (`[evaluation]` section)

use navigator_application::EvaluationParams;
use navigator_domain::{
    DEFAULT_CHUNK_PROMPT_BUDGET, DEFAULT_CHUNK_SIZE, DEFAULT_FINAL_PROMPT_BUDGET, Model,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEvaluationConfig {
    /// Navigator models, evaluated in this order (empty: built-in defaults)
    pub models: Vec<String>,
    /// Questions per chunk
    pub chunk_size: usize,
    /// Pause between consecutive remote calls, in milliseconds
    pub inter_call_delay_ms: u64,
    /// Models with fewer successful chunks are skipped
    pub min_successful_chunks: usize,
    /// Per-call timeout in seconds (unset: wait for the provider)
    pub timeout_seconds: Option<u64>,
    /// Byte budget of a chunk prompt
    pub chunk_prompt_budget: usize,
    /// Byte budget of the final-assessment prompt
    pub final_prompt_budget: usize,
}

impl Default for FileEvaluationConfig {
    fn default() -> Self {
        Self {
            models: Vec::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            inter_call_delay_ms: 2000,
            min_successful_chunks: 1,
            timeout_seconds: None,
            chunk_prompt_budget: DEFAULT_CHUNK_PROMPT_BUDGET,
            final_prompt_budget: DEFAULT_FINAL_PROMPT_BUDGET,
        }
    }
}

impl FileEvaluationConfig {
    /// Configured models, or the default navigator set when none are listed
    pub fn parse_models(&self) -> Vec<Model> {
        if self.models.is_empty() {
            return Model::default_models();
        }
        self.models
            .iter()
            .map(|s| {
                let Ok(model) = s.parse::<Model>();
                model
            })
            .collect()
    }

    pub fn to_params(&self) -> EvaluationParams {
        EvaluationParams::default()
            .with_chunk_size(self.chunk_size)
            .with_inter_call_delay(Duration::from_millis(self.inter_call_delay_ms))
            .with_min_successful_chunks(self.min_successful_chunks)
            .with_call_timeout(self.timeout_seconds.map(Duration::from_secs))
            .with_prompt_budgets(self.chunk_prompt_budget, self.final_prompt_budget)
    }
}
