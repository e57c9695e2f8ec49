//! Domain layer for keyword-navigator
//!
//! This crate contains the core evaluation logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Navigator evaluation
//!
//! Several models act as *navigators*: given the aggregate keyword data of
//! four extraction profiles, they report which terms a searcher could
//! discover for each question and score every profile from 0 to 10.
//!
//! ## Consensus
//!
//! Each completed model recommends one profile. Recommendations are tallied
//! into votes and an agreement ratio across models.

pub mod config;
pub mod consensus;
pub mod core;
pub mod evaluation;
pub mod prompt;
pub mod providers;

// Re-export commonly used types
pub use config::OutputFormat;
pub use core::{error::DomainError, model::Model};
pub use evaluation::{
    AssessmentSource, ChunkFailure, ChunkFailureKind, ChunkResult, ChunkScores, ChunkSpec,
    ChunkStatus, Confidence, DEFAULT_CHUNK_SIZE, EvaluationReport, ExtractionParams,
    FinalAssessment, KeywordEntry, MergedResult, ModelEvaluation, PipelineState, Profile,
    ProfileId, ProfileScore, ProfileSummary, QUESTION_COUNT, Question, QuestionId,
    Recommendation, RunSettings, ScoreMerger, ScoreValidationError, SkipReason, SkippedModel,
    validate_chunk_response,
};
pub use prompt::{DEFAULT_CHUNK_PROMPT_BUDGET, DEFAULT_FINAL_PROMPT_BUDGET, PromptBuilder};
pub use providers::{
    AnthropicProviderConfig, OpenAiCompatibleConfig, ProviderConfig, ProviderKind,
};
pub use consensus::{ConsensusReport, CrossModelAggregator};
