//! Retry Chunks use case
//!
//! The pipeline never retries on its own. This use case re-runs selected
//! chunks of one model from a persisted document, then re-merges,
//! re-assesses and updates the consensus.
//!
//! A retry that the provider rejects outright (authentication, unavailable
//! model) leaves the saved document untouched.

use crate::config::EvaluationParams;
use crate::ports::call_logger::{CallLogger, NoCallLogger};
use crate::ports::evaluation_repository::{EvaluationRepository, RepositoryError};
use crate::ports::model_client::LlmGateway;
use crate::ports::profile_data::ProfileDataSource;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::rate_limiter::{FixedIntervalLimiter, RateLimiter};
use crate::use_cases::evaluate_model::ModelEvaluationPipeline;
use crate::use_cases::plan::EvaluationPlan;
use navigator_domain::{DomainError, EvaluationReport, Model, PipelineState, SkipReason};
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum RetryChunksError {
    #[error("No saved evaluation to retry; run an evaluation first")]
    NoReport,

    #[error("Model {0} is not in the saved evaluation")]
    UnknownModel(String),

    #[error("Retry of {model} aborted ({reason}); saved results unchanged")]
    Aborted { model: String, reason: SkipReason },

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Failed to load or persist results: {0}")]
    Repository(#[from] RepositoryError),
}

impl RetryChunksError {
    pub fn is_config(&self) -> bool {
        match self {
            RetryChunksError::NoReport | RetryChunksError::UnknownModel(_) => true,
            RetryChunksError::Domain(e) => e.is_config(),
            RetryChunksError::Aborted { .. } | RetryChunksError::Repository(_) => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetryChunksInput {
    pub model: Model,
    /// Chunk indices to re-run; empty re-runs every failed chunk
    pub chunks: Vec<usize>,
    pub params: EvaluationParams,
}

#[derive(Debug, Clone)]
pub struct RetryChunksOutput {
    pub report: EvaluationReport,
    /// Chunks that were re-run
    pub retried: Vec<usize>,
    pub state: PipelineState,
}

pub struct RetryChunksUseCase<G: LlmGateway + 'static> {
    gateway: Arc<G>,
    data: Arc<dyn ProfileDataSource>,
    repository: Arc<dyn EvaluationRepository>,
    limiter: Option<Arc<dyn RateLimiter>>,
    call_logger: Arc<dyn CallLogger>,
}

impl<G: LlmGateway + 'static> RetryChunksUseCase<G> {
    pub fn new(
        gateway: Arc<G>,
        data: Arc<dyn ProfileDataSource>,
        repository: Arc<dyn EvaluationRepository>,
    ) -> Self {
        Self {
            gateway,
            data,
            repository,
            limiter: None,
            call_logger: Arc::new(NoCallLogger),
        }
    }

    pub fn with_rate_limiter(mut self, limiter: Arc<dyn RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    pub fn with_call_logger(mut self, logger: Arc<dyn CallLogger>) -> Self {
        self.call_logger = logger;
        self
    }

    pub async fn execute(
        &self,
        input: RetryChunksInput,
    ) -> Result<RetryChunksOutput, RetryChunksError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    pub async fn execute_with_progress(
        &self,
        input: RetryChunksInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<RetryChunksOutput, RetryChunksError> {
        let plan = EvaluationPlan::prepare(input.params, self.data.as_ref())?;

        let mut report = self.repository.load()?.ok_or(RetryChunksError::NoReport)?;
        let settings = plan.params.run_settings();
        if report.settings != settings {
            return Err(DomainError::config(format!(
                "saved evaluation used chunk_size {} and min_successful_chunks {}, \
                 current configuration has {} and {}",
                report.settings.chunk_size,
                report.settings.min_successful_chunks,
                settings.chunk_size,
                settings.min_successful_chunks
            ))
            .into());
        }

        let model_id = input.model.to_string();
        let previous = report
            .models
            .get(&model_id)
            .cloned()
            .ok_or_else(|| RetryChunksError::UnknownModel(model_id.clone()))?;

        let retry = select_chunks(&plan, &input.chunks, &previous.failed_chunk_indices())?;
        if retry.is_empty() {
            info!("{}: no failed chunks to retry", model_id);
            return Ok(RetryChunksOutput {
                state: previous.state,
                report,
                retried: Vec::new(),
            });
        }
        info!("{}: retrying chunks {:?}", model_id, retry);

        let limiter: Arc<dyn RateLimiter> = match &self.limiter {
            Some(limiter) => Arc::clone(limiter),
            None => Arc::new(FixedIntervalLimiter::new(plan.params.inter_call_delay)),
        };
        let client = self.gateway.create_client(&input.model).await;
        let evaluation =
            ModelEvaluationPipeline::new(&plan, limiter.as_ref(), self.call_logger.as_ref())
                .reevaluate(&previous, &retry, client, progress)
                .await?;

        if let Some(reason) = evaluation.skip_reason
            && matches!(
                reason,
                SkipReason::Authentication | SkipReason::ModelUnavailable
            )
        {
            warn!("{}: retry aborted ({}), nothing saved", model_id, reason);
            return Err(RetryChunksError::Aborted {
                model: model_id,
                reason,
            });
        }

        let state = evaluation.state;
        report.upsert(evaluation);
        report.generated_at = chrono::Utc::now().to_rfc3339();
        self.repository.save(&report)?;

        Ok(RetryChunksOutput {
            report,
            retried: retry.into_iter().collect(),
            state,
        })
    }
}

/// Requested chunks, or every failed one when none were requested.
fn select_chunks(
    plan: &EvaluationPlan,
    requested: &[usize],
    failed: &[usize],
) -> Result<BTreeSet<usize>, DomainError> {
    if requested.is_empty() {
        return Ok(failed.iter().copied().collect());
    }
    for index in requested {
        if !plan.chunks.iter().any(|c| c.chunk_index == *index) {
            return Err(DomainError::config(format!(
                "chunk {} does not exist (1..={})",
                index,
                plan.chunks.len()
            )));
        }
    }
    Ok(requested.iter().copied().collect())
}
