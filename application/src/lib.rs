//! Application layer for keyword-navigator
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::EvaluationParams;
pub use ports::{
    call_logger::{CallEvent, CallLogger, NoCallLogger},
    evaluation_repository::{EvaluationRepository, RepositoryError},
    model_client::{GatewayError, LlmGateway, ModelClient},
    profile_data::{ProfileDataError, ProfileDataSource},
    progress::{NoProgress, ProgressNotifier},
    rate_limiter::{FixedIntervalLimiter, RateLimiter, Unthrottled},
};
pub use use_cases::evaluate_model::ModelEvaluationPipeline;
pub use use_cases::final_assessment::FinalAssessor;
pub use use_cases::plan::EvaluationPlan;
pub use use_cases::retry_chunks::{
    RetryChunksError, RetryChunksInput, RetryChunksOutput, RetryChunksUseCase,
};
pub use use_cases::run_chunks::{ChunkRunOutcome, ChunkRunner};
pub use use_cases::run_evaluation::{
    RunEvaluationError, RunEvaluationInput, RunEvaluationOutput, RunEvaluationUseCase,
};
