//! Aggregate evaluation document
//!
//! The persisted document is keyed by model id, with the run metadata and
//! the consensus as reserved sibling keys:
//!
//! ```json
//! {
//!   "generated_at": "2025-06-01T12:00:00Z",
//!   "settings": { "chunk_size": 6, "question_count": 18, "min_successful_chunks": 1 },
//!   "gpt-5": { "model_id": "gpt-5", "state": "DONE", "chunk_results": [...], ... },
//!   "consensus": { "votes": { ... }, "agreement_ratio": 0.6, ... },
//!   "skipped": [{ "model_id": "o3", "reason": "authentication" }]
//! }
//! ```

use super::state::{ModelEvaluation, SkipReason};
use crate::core::error::DomainError;
use crate::consensus::{ConsensusReport, CrossModelAggregator};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Run settings recorded alongside the results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSettings {
    pub chunk_size: usize,
    pub question_count: usize,
    pub min_successful_chunks: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedModel {
    pub model_id: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub generated_at: String,
    pub settings: RunSettings,
    #[serde(flatten)]
    pub models: BTreeMap<String, ModelEvaluation>,
    pub consensus: ConsensusReport,
    #[serde(default)]
    pub skipped: Vec<SkippedModel>,
}

impl EvaluationReport {
    /// Top-level keys that cannot be used as model ids
    pub const RESERVED_KEYS: [&'static str; 4] = ["generated_at", "settings", "consensus", "skipped"];

    pub fn new(generated_at: impl Into<String>, settings: RunSettings) -> Self {
        Self {
            generated_at: generated_at.into(),
            settings,
            models: BTreeMap::new(),
            consensus: ConsensusReport::default(),
            skipped: Vec::new(),
        }
    }

    pub fn check_model_id(model_id: &str) -> Result<(), DomainError> {
        if Self::RESERVED_KEYS.contains(&model_id) {
            return Err(DomainError::config(format!(
                "model id `{}` collides with a reserved report key",
                model_id
            )));
        }
        Ok(())
    }

    /// Insert or replace a model's evaluation and refresh derived fields.
    pub fn upsert(&mut self, evaluation: ModelEvaluation) {
        self.models.insert(evaluation.model_id.clone(), evaluation);
        self.refresh();
    }

    /// Recompute `consensus` and `skipped` from the stored evaluations.
    pub fn refresh(&mut self) {
        self.consensus = CrossModelAggregator::aggregate(self.models.values());
        self.skipped = self
            .models
            .values()
            .filter(|e| e.is_skipped())
            .map(|e| SkippedModel {
                model_id: e.model_id.clone(),
                reason: e.skip_reason.unwrap_or(SkipReason::NoSuccessfulChunks),
            })
            .collect();
    }

    pub fn degraded_models(&self) -> Vec<&str> {
        self.models
            .values()
            .filter(|e| e.is_done() && e.has_chunk_errors())
            .map(|e| e.model_id.as_str())
            .collect()
    }
}
