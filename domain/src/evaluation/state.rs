//! Per-model evaluation state machine
//!
//! ```text
//! INIT ──► CHUNKING ──► MERGING ──┬──► SKIPPED      (terminal, excluded)
//!                                 └──► FINALIZING ──► DONE (terminal, included)
//! ```

use super::assessment::FinalAssessment;
use super::merge::MergedResult;
use super::scores::ChunkResult;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineState {
    Init,
    Chunking,
    Merging,
    Skipped,
    Finalizing,
    Done,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Init => "INIT",
            PipelineState::Chunking => "CHUNKING",
            PipelineState::Merging => "MERGING",
            PipelineState::Skipped => "SKIPPED",
            PipelineState::Finalizing => "FINALIZING",
            PipelineState::Done => "DONE",
        }
    }

    pub fn can_transition_to(&self, next: PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (self, next),
            (Init, Chunking)
                | (Chunking, Merging)
                | (Merging, Skipped)
                | (Merging, Finalizing)
                | (Finalizing, Done)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Skipped | PipelineState::Done)
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a model left the pipeline without a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoSuccessfulChunks,
    /// Fewer chunks succeeded than the configured minimum
    InsufficientChunks,
    /// The provider rejected the credentials
    Authentication,
    /// No provider can serve the model
    ModelUnavailable,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SkipReason::NoSuccessfulChunks => "no successful chunks",
            SkipReason::InsufficientChunks => "too few successful chunks",
            SkipReason::Authentication => "authentication rejected",
            SkipReason::ModelUnavailable => "model unavailable",
        };
        write!(f, "{}", s)
    }
}

/// Everything one model produced in one run (Entity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEvaluation {
    pub model_id: String,
    pub state: PipelineState,
    pub chunk_results: Vec<ChunkResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged: Option<MergedResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_assessment: Option<FinalAssessment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<SkipReason>,
}

impl ModelEvaluation {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            state: PipelineState::Init,
            chunk_results: Vec::new(),
            merged: None,
            final_assessment: None,
            skip_reason: None,
        }
    }

    /// Move to `next`, rejecting transitions outside the state machine.
    pub fn transition(&mut self, next: PipelineState) -> Result<(), DomainError> {
        if !self.state.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        self.state = next;
        Ok(())
    }

    pub fn skip(&mut self, reason: SkipReason) -> Result<(), DomainError> {
        self.transition(PipelineState::Skipped)?;
        self.skip_reason = Some(reason);
        self.final_assessment = None;
        Ok(())
    }

    pub fn finish(&mut self, assessment: FinalAssessment) -> Result<(), DomainError> {
        self.transition(PipelineState::Done)?;
        self.final_assessment = Some(assessment);
        Ok(())
    }

    pub fn is_done(&self) -> bool {
        self.state == PipelineState::Done
    }

    pub fn is_skipped(&self) -> bool {
        self.state == PipelineState::Skipped
    }

    /// Degraded: reached a result with some chunks missing
    pub fn has_chunk_errors(&self) -> bool {
        self.merged.as_ref().is_some_and(|m| m.chunk_errors)
    }

    pub fn failed_chunk_indices(&self) -> Vec<usize> {
        self.chunk_results
            .iter()
            .filter(|r| !r.is_ok())
            .map(|r| r.chunk_index)
            .collect()
    }
}
