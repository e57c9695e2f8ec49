//! Evaluation parameters: run control for the navigator pipeline.
//!
//! [`EvaluationParams`] is built once per run from the merged configuration
//! and passed explicitly to every use case. Nothing reads it from globals.

use navigator_domain::{
    DEFAULT_CHUNK_PROMPT_BUDGET, DEFAULT_CHUNK_SIZE, DEFAULT_FINAL_PROMPT_BUDGET, DomainError,
    PromptBuilder, QUESTION_COUNT, RunSettings,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default pause between consecutive remote calls.
pub const DEFAULT_INTER_CALL_DELAY: Duration = Duration::from_secs(2);

/// Run control parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationParams {
    /// Questions per chunk (default: 6).
    pub chunk_size: usize,
    /// Minimum pause between the starts of consecutive remote calls.
    pub inter_call_delay: Duration,
    /// Models with fewer successful chunks than this are skipped (default: 1).
    pub min_successful_chunks: usize,
    /// Per-call timeout. `None` waits for the provider.
    pub call_timeout: Option<Duration>,
    /// Byte budget for a chunk prompt.
    pub chunk_prompt_budget: usize,
    /// Byte budget for the final-assessment prompt.
    pub final_prompt_budget: usize,
}

impl Default for EvaluationParams {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            inter_call_delay: DEFAULT_INTER_CALL_DELAY,
            min_successful_chunks: 1,
            call_timeout: None,
            chunk_prompt_budget: DEFAULT_CHUNK_PROMPT_BUDGET,
            final_prompt_budget: DEFAULT_FINAL_PROMPT_BUDGET,
        }
    }
}

impl EvaluationParams {
    // ==================== Builder Methods ====================

    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    pub fn with_inter_call_delay(mut self, delay: Duration) -> Self {
        self.inter_call_delay = delay;
        self
    }

    pub fn with_min_successful_chunks(mut self, min: usize) -> Self {
        self.min_successful_chunks = min;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_prompt_budgets(mut self, chunk: usize, final_assessment: usize) -> Self {
        self.chunk_prompt_budget = chunk;
        self.final_prompt_budget = final_assessment;
        self
    }

    // ==================== Derived ====================

    pub fn prompt_builder(&self) -> PromptBuilder {
        PromptBuilder::new(self.chunk_prompt_budget, self.final_prompt_budget)
    }

    pub fn run_settings(&self) -> RunSettings {
        RunSettings {
            chunk_size: self.chunk_size,
            question_count: QUESTION_COUNT,
            min_successful_chunks: self.min_successful_chunks,
        }
    }

    /// Reject values the pipeline cannot run with.
    ///
    /// Chunk-size bounds against the question count are checked when the
    /// chunks are partitioned.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.chunk_size == 0 {
            return Err(DomainError::config("chunk_size must be at least 1"));
        }
        if self.min_successful_chunks == 0 {
            return Err(DomainError::config(
                "min_successful_chunks must be at least 1",
            ));
        }
        if self.call_timeout.is_some_and(|t| t.is_zero()) {
            return Err(DomainError::config("timeout must be greater than zero"));
        }
        if self.chunk_prompt_budget == 0 || self.final_prompt_budget == 0 {
            return Err(DomainError::config("prompt budgets must be greater than zero"));
        }
        Ok(())
    }
}
