//! Run Evaluation use case
//!
//! Evaluates every configured model in order, one after another, and keeps
//! the aggregate document current after each model. Configuration problems
//! are detected before the first remote call.

use crate::config::EvaluationParams;
use crate::ports::call_logger::{CallLogger, NoCallLogger};
use crate::ports::evaluation_repository::{EvaluationRepository, RepositoryError};
use crate::ports::model_client::LlmGateway;
use crate::ports::profile_data::ProfileDataSource;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::rate_limiter::{FixedIntervalLimiter, RateLimiter};
use crate::use_cases::evaluate_model::ModelEvaluationPipeline;
use crate::use_cases::plan::EvaluationPlan;
use navigator_domain::{DomainError, EvaluationReport, Model};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Errors that end an evaluation run
#[derive(Error, Debug)]
pub enum RunEvaluationError {
    #[error("No models configured")]
    NoModels,

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Failed to persist results: {0}")]
    Repository(#[from] RepositoryError),
}

impl RunEvaluationError {
    /// Configuration problems, detected before any remote call
    pub fn is_config(&self) -> bool {
        match self {
            RunEvaluationError::NoModels => true,
            RunEvaluationError::Domain(e) => e.is_config(),
            RunEvaluationError::Repository(_) => false,
        }
    }
}

/// Input for the RunEvaluation use case
#[derive(Debug, Clone)]
pub struct RunEvaluationInput {
    /// Models to evaluate, in order
    pub models: Vec<Model>,
    pub params: EvaluationParams,
}

impl RunEvaluationInput {
    pub fn new(models: Vec<Model>, params: EvaluationParams) -> Self {
        Self { models, params }
    }
}

#[derive(Debug, Clone)]
pub struct RunEvaluationOutput {
    pub report: EvaluationReport,
    /// The run was cancelled before every model was evaluated
    pub interrupted: bool,
}

/// Use case for running the navigator evaluation across models
pub struct RunEvaluationUseCase<G: LlmGateway + 'static> {
    gateway: Arc<G>,
    data: Arc<dyn ProfileDataSource>,
    repository: Arc<dyn EvaluationRepository>,
    limiter: Option<Arc<dyn RateLimiter>>,
    call_logger: Arc<dyn CallLogger>,
    cancellation: Option<CancellationToken>,
}

impl<G: LlmGateway + 'static> RunEvaluationUseCase<G> {
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
            cancellation: None,
        }
    }

    /// Replace the default fixed-interval limiter
    pub fn with_rate_limiter(mut self, limiter: Arc<dyn RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    pub fn with_call_logger(mut self, logger: Arc<dyn CallLogger>) -> Self {
        self.call_logger = logger;
        self
    }

    /// Stop between models once the token is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        input: RunEvaluationInput,
    ) -> Result<RunEvaluationOutput, RunEvaluationError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: RunEvaluationInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<RunEvaluationOutput, RunEvaluationError> {
        validate_models(&input.models)?;
        let plan = EvaluationPlan::prepare(input.params, self.data.as_ref())?;

        let limiter: Arc<dyn RateLimiter> = match &self.limiter {
            Some(limiter) => Arc::clone(limiter),
            None => Arc::new(FixedIntervalLimiter::new(plan.params.inter_call_delay)),
        };
        let pipeline =
            ModelEvaluationPipeline::new(&plan, limiter.as_ref(), self.call_logger.as_ref());

        info!(
            "Evaluating {} models over {} chunks",
            input.models.len(),
            plan.chunks.len()
        );

        let mut report = EvaluationReport::new(
            chrono::Utc::now().to_rfc3339(),
            plan.params.run_settings(),
        );
        let mut interrupted = false;

        for (i, model) in input.models.iter().enumerate() {
            if self.is_cancelled() {
                warn!(
                    "Cancelled after {} of {} models",
                    i,
                    input.models.len()
                );
                interrupted = true;
                break;
            }

            let client = self.gateway.create_client(model).await;
            let evaluation = pipeline.evaluate(model, client, progress).await?;
            report.upsert(evaluation);
            self.repository.save(&report)?;
        }

        if report.models.is_empty() {
            self.repository.save(&report)?;
        }

        info!(
            "Consensus over {} models: agreement {:.2}",
            report.consensus.models_counted, report.consensus.agreement_ratio
        );

        Ok(RunEvaluationOutput {
            report,
            interrupted,
        })
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}

/// Reject empty or duplicate model lists and reserved ids.
pub(crate) fn validate_models(models: &[Model]) -> Result<(), RunEvaluationError> {
    if models.is_empty() {
        return Err(RunEvaluationError::NoModels);
    }
    let mut seen = HashSet::new();
    for model in models {
        let id = model.as_str();
        if id.trim().is_empty() {
            return Err(DomainError::config("model id must not be empty").into());
        }
        EvaluationReport::check_model_id(id)?;
        if !seen.insert(id) {
            return Err(DomainError::config(format!("model `{}` is listed twice", id)).into());
        }
    }
    Ok(())
}
