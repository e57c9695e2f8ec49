//! Per-model evaluation pipeline
//!
//! Drives one model through the state machine:
//!
//! ```text
//! INIT ──► CHUNKING ──► MERGING ──┬──► SKIPPED
//!                                 └──► FINALIZING ──► DONE
//! ```
//!
//! Chunk failures degrade the result; they never fail the model unless no
//! chunk (or fewer than the configured minimum) succeeded, or the provider
//! rejected the model outright.

use crate::ports::call_logger::CallLogger;
use crate::ports::model_client::{GatewayError, ModelClient};
use crate::ports::progress::ProgressNotifier;
use crate::ports::rate_limiter::RateLimiter;
use crate::use_cases::final_assessment::FinalAssessor;
use crate::use_cases::plan::EvaluationPlan;
use crate::use_cases::run_chunks::{ChunkRunOutcome, ChunkRunner};
use navigator_domain::{
    ChunkResult, DomainError, Model, ModelEvaluation, PipelineState, ScoreMerger, SkipReason,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{info, warn};

pub struct ModelEvaluationPipeline<'a> {
    plan: &'a EvaluationPlan,
    limiter: &'a dyn RateLimiter,
    logger: &'a dyn CallLogger,
}

impl<'a> ModelEvaluationPipeline<'a> {
    pub fn new(
        plan: &'a EvaluationPlan,
        limiter: &'a dyn RateLimiter,
        logger: &'a dyn CallLogger,
    ) -> Self {
        Self {
            plan,
            limiter,
            logger,
        }
    }

    /// Evaluate a model from scratch.
    ///
    /// `client` is the gateway's answer for this model; a creation failure
    /// skips the model without any remote call.
    pub async fn evaluate(
        &self,
        model: &Model,
        client: Result<Arc<dyn ModelClient>, GatewayError>,
        progress: &dyn ProgressNotifier,
    ) -> Result<ModelEvaluation, DomainError> {
        self.drive(
            model,
            client,
            BTreeMap::new(),
            BTreeMap::new(),
            self.plan.calls_per_model(),
            progress,
        )
        .await
    }

    /// Re-run `retry` chunks of an earlier evaluation, keeping the rest.
    ///
    /// Merging and the final assessment are redone over the combined results.
    /// A retried chunk that succeeded before keeps its earlier scores when
    /// the new attempt fails.
    pub async fn reevaluate(
        &self,
        previous: &ModelEvaluation,
        retry: &BTreeSet<usize>,
        client: Result<Arc<dyn ModelClient>, GatewayError>,
        progress: &dyn ProgressNotifier,
    ) -> Result<ModelEvaluation, DomainError> {
        let Ok(model) = previous.model_id.parse::<Model>();
        let preserved: BTreeMap<usize, ChunkResult> = previous
            .chunk_results
            .iter()
            .filter(|r| !retry.contains(&r.chunk_index))
            .map(|r| (r.chunk_index, r.clone()))
            .collect();
        let earlier: BTreeMap<usize, ChunkResult> = previous
            .chunk_results
            .iter()
            .filter(|r| retry.contains(&r.chunk_index) && r.is_ok())
            .map(|r| (r.chunk_index, r.clone()))
            .collect();
        self.drive(&model, client, preserved, earlier, retry.len() + 1, progress)
            .await
    }

    async fn drive(
        &self,
        model: &Model,
        client: Result<Arc<dyn ModelClient>, GatewayError>,
        preserved: BTreeMap<usize, ChunkResult>,
        earlier: BTreeMap<usize, ChunkResult>,
        total_calls: usize,
        progress: &dyn ProgressNotifier,
    ) -> Result<ModelEvaluation, DomainError> {
        let mut evaluation = ModelEvaluation::new(model.as_str());
        progress.on_model_start(model, total_calls);
        info!("{}: starting evaluation", model);

        // CHUNKING
        evaluation.transition(PipelineState::Chunking)?;
        let client = match client {
            Ok(client) => client,
            Err(e) => {
                warn!("{}: no client ({})", model, e);
                let outcome = self.unreachable_outcome(model, &preserved, &e);
                evaluation.chunk_results =
                    keep_earlier_successes(model, outcome.results, &earlier);
                evaluation.transition(PipelineState::Merging)?;
                evaluation.merged = ScoreMerger::merge(model.as_str(), &evaluation.chunk_results);
                let reason = outcome.abort.unwrap_or(SkipReason::ModelUnavailable);
                return self.skipped(model, evaluation, reason, progress);
            }
        };
        let outcome = ChunkRunner::new(self.plan, self.limiter, self.logger)
            .run(client.as_ref(), &preserved, progress)
            .await;
        evaluation.chunk_results = keep_earlier_successes(model, outcome.results, &earlier);

        // MERGING
        evaluation.transition(PipelineState::Merging)?;
        let merged = ScoreMerger::merge(model.as_str(), &evaluation.chunk_results);

        if let Some(reason) = outcome.abort {
            evaluation.merged = merged;
            return self.skipped(model, evaluation, reason, progress);
        }
        let Some(merged) = merged else {
            return self.skipped(model, evaluation, SkipReason::NoSuccessfulChunks, progress);
        };
        if merged.succeeded_chunks.len() < self.plan.params.min_successful_chunks {
            warn!(
                "{}: {} of {} chunks succeeded, {} required",
                model,
                merged.succeeded_chunks.len(),
                self.plan.chunks.len(),
                self.plan.params.min_successful_chunks
            );
            evaluation.merged = Some(merged);
            return self.skipped(model, evaluation, SkipReason::InsufficientChunks, progress);
        }
        if merged.chunk_errors {
            warn!(
                "{}: degraded result, chunks {:?} failed",
                model, merged.failed_chunks
            );
        }

        // FINALIZING
        evaluation.transition(PipelineState::Finalizing)?;
        let assessor = FinalAssessor::new(
            self.limiter,
            self.logger,
            self.plan.params.prompt_builder(),
            self.plan.params.call_timeout,
        );
        let assessment = assessor.assess(client.as_ref(), &merged).await;
        progress.on_final_complete(model, assessment.is_fallback());
        evaluation.merged = Some(merged);

        // DONE
        evaluation.finish(assessment)?;
        info!("{}: done", model);
        progress.on_model_complete(model, evaluation.state);
        Ok(evaluation)
    }

    /// Chunk results for a model whose client could not be created.
    fn unreachable_outcome(
        &self,
        model: &Model,
        preserved: &BTreeMap<usize, ChunkResult>,
        error: &GatewayError,
    ) -> ChunkRunOutcome {
        let results = self
            .plan
            .chunks
            .iter()
            .map(|chunk| match preserved.get(&chunk.chunk_index) {
                Some(kept) => kept.clone(),
                None => ChunkResult::failed(
                    model.as_str(),
                    chunk.chunk_index,
                    error.failure_kind(),
                    error.to_string(),
                ),
            })
            .collect();
        ChunkRunOutcome {
            results,
            abort: error.abort_reason(),
        }
    }

    fn skipped(
        &self,
        model: &Model,
        mut evaluation: ModelEvaluation,
        reason: SkipReason,
        progress: &dyn ProgressNotifier,
    ) -> Result<ModelEvaluation, DomainError> {
        warn!("{}: skipped ({})", model, reason);
        evaluation.skip(reason)?;
        progress.on_model_complete(model, evaluation.state);
        Ok(evaluation)
    }
}

/// Put back earlier successful results for chunks whose retry failed.
fn keep_earlier_successes(
    model: &Model,
    results: Vec<ChunkResult>,
    earlier: &BTreeMap<usize, ChunkResult>,
) -> Vec<ChunkResult> {
    results
        .into_iter()
        .map(|result| match earlier.get(&result.chunk_index) {
            Some(kept) if !result.is_ok() => {
                warn!(
                    "{}: retry of chunk {} failed, keeping earlier scores",
                    model, result.chunk_index
                );
                kept.clone()
            }
            _ => result,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EvaluationParams;
    use crate::ports::call_logger::NoCallLogger;
    use crate::ports::progress::NoProgress;
    use crate::ports::rate_limiter::Unthrottled;
    use crate::use_cases::testing::{
        ScriptedClient, StaticProfiles, chunk_response, chunk_response_by_question,
        final_response,
    };
    use navigator_domain::{ChunkFailureKind, Confidence, ProfileId, QuestionId};
    use serde_json::json;

    fn plan_with(params: EvaluationParams) -> EvaluationPlan {
        EvaluationPlan::prepare(params, &StaticProfiles::new()).unwrap()
    }

    fn model() -> Model {
        "gpt-5".parse().unwrap()
    }

    async fn run(plan: &EvaluationPlan, client: Arc<ScriptedClient>) -> ModelEvaluation {
        ModelEvaluationPipeline::new(plan, &Unthrottled, &NoCallLogger)
            .evaluate(&model(), Ok(client as Arc<dyn ModelClient>), &NoProgress)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_happy_path_reaches_done() {
        let plan = plan_with(EvaluationParams::default());
        let mut script: Vec<_> = plan
            .chunks
            .iter()
            .map(|c| Ok(chunk_response(c, [4, 6, 8, 5])))
            .collect();
        script.push(Ok(final_response("moderate", "high")));
        let client = Arc::new(ScriptedClient::new("gpt-5", script));

        let evaluation = run(&plan, Arc::clone(&client)).await;

        assert_eq!(evaluation.state, PipelineState::Done);
        assert_eq!(client.call_count(), 4);
        let merged = evaluation.merged.as_ref().unwrap();
        assert!(!merged.chunk_errors);
        assert_eq!(merged.profile_totals[&ProfileId::Moderate], 144);
        assert!(!evaluation.final_assessment.unwrap().is_fallback());
    }

    #[tokio::test]
    async fn test_degraded_model_excludes_failed_chunk() {
        let plan = plan_with(EvaluationParams::default());
        let client = Arc::new(ScriptedClient::new(
            "gpt-5",
            vec![
                Ok(chunk_response(&plan.chunks[0], [4, 6, 8, 5])),
                Ok(json!({ "not": "scores" })),
                Ok(chunk_response(&plan.chunks[2], [4, 6, 8, 5])),
                Ok(final_response("moderate", "medium")),
            ],
        ));

        let evaluation = run(&plan, client).await;

        assert!(evaluation.is_done());
        assert!(evaluation.has_chunk_errors());
        let merged = evaluation.merged.as_ref().unwrap();
        assert_eq!(merged.questions_scored(), 12);
        assert_eq!(merged.failed_chunks, vec![2]);
        // 12 questions, not 18 with zeros
        assert_eq!(merged.profile_totals[&ProfileId::Moderate], 96);
        assert_eq!(evaluation.failed_chunk_indices(), vec![2]);
    }

    #[tokio::test]
    async fn test_no_successful_chunks_skips_without_final_call() {
        let plan = plan_with(EvaluationParams::default());
        let client = Arc::new(ScriptedClient::new(
            "gpt-5",
            vec![Ok(json!({})), Ok(json!({})), Ok(json!({}))],
        ));

        let evaluation = run(&plan, Arc::clone(&client)).await;

        assert_eq!(evaluation.state, PipelineState::Skipped);
        assert_eq!(evaluation.skip_reason, Some(SkipReason::NoSuccessfulChunks));
        assert!(evaluation.merged.is_none());
        assert!(evaluation.final_assessment.is_none());
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn test_min_successful_chunks_threshold() {
        let plan = plan_with(EvaluationParams::default().with_min_successful_chunks(2));
        let client = Arc::new(ScriptedClient::new(
            "gpt-5",
            vec![
                Ok(chunk_response(&plan.chunks[0], [4, 6, 8, 5])),
                Err(GatewayError::Transport("reset".into())),
                Err(GatewayError::Transport("reset".into())),
            ],
        ));

        let evaluation = run(&plan, Arc::clone(&client)).await;

        assert_eq!(evaluation.skip_reason, Some(SkipReason::InsufficientChunks));
        assert!(evaluation.merged.is_some());
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn test_final_call_failure_uses_fallback() {
        let plan = plan_with(EvaluationParams::default());
        let mut script: Vec<_> = plan
            .chunks
            .iter()
            .map(|c| Ok(chunk_response(c, [9, 6, 8, 5])))
            .collect();
        script.push(Err(GatewayError::Timeout(30)));
        let client = Arc::new(ScriptedClient::new("gpt-5", script));

        let evaluation = run(&plan, client).await;

        assert!(evaluation.is_done());
        let assessment = evaluation.final_assessment.unwrap();
        assert!(assessment.is_fallback());
        assert_eq!(
            assessment.recommendation.best_for_production,
            ProfileId::Baseline
        );
    }

    // Totals over 18 questions: baseline 72, current 98, moderate 112, aggressive 108
    fn uneven_scores(question: &QuestionId) -> [u8; 4] {
        let i = question.number() - 1;
        [
            4,
            if i < 8 { 6 } else { 5 },
            if i < 4 { 7 } else { 6 },
            6,
        ]
    }

    #[tokio::test]
    async fn test_model_answer_and_fallback_agree_on_moderate() {
        let plan = plan_with(EvaluationParams::default());
        let chunk_calls = || -> Vec<Result<serde_json::Value, GatewayError>> {
            plan.chunks
                .iter()
                .map(|c| Ok(chunk_response_by_question(c, uneven_scores)))
                .collect()
        };

        let mut answered = chunk_calls();
        answered.push(Ok(final_response("moderate", "high")));
        let mut unanswered = chunk_calls();
        unanswered.push(Err(GatewayError::Transport("connection reset".into())));

        for (script, fallback) in [(answered, false), (unanswered, true)] {
            let client = Arc::new(ScriptedClient::new("gpt-5", script));
            let evaluation = run(&plan, client).await;

            assert!(evaluation.is_done());
            let totals = &evaluation.merged.as_ref().unwrap().profile_totals;
            assert_eq!(totals[&ProfileId::Baseline], 72);
            assert_eq!(totals[&ProfileId::Current], 98);
            assert_eq!(totals[&ProfileId::Moderate], 112);
            assert_eq!(totals[&ProfileId::Aggressive], 108);

            let assessment = evaluation.final_assessment.unwrap();
            assert_eq!(assessment.is_fallback(), fallback);
            assert_eq!(
                assessment.recommendation.best_for_production,
                ProfileId::Moderate
            );
            if fallback {
                assert_eq!(assessment.recommendation.confidence, Confidence::Low);
            }
        }
    }

    #[tokio::test]
    async fn test_auth_failure_skips_model() {
        let plan = plan_with(EvaluationParams::default());
        let client = Arc::new(ScriptedClient::new(
            "gpt-5",
            vec![Err(GatewayError::Auth("401".into()))],
        ));

        let evaluation = run(&plan, Arc::clone(&client)).await;

        assert_eq!(evaluation.skip_reason, Some(SkipReason::Authentication));
        assert_eq!(client.call_count(), 1);
        assert_eq!(evaluation.chunk_results.len(), 3);
    }

    #[tokio::test]
    async fn test_client_creation_failure_skips_without_calls() {
        let plan = plan_with(EvaluationParams::default());
        let evaluation = ModelEvaluationPipeline::new(&plan, &Unthrottled, &NoCallLogger)
            .evaluate(
                &model(),
                Err(GatewayError::Auth("OPENAI_API_KEY is not set".into())),
                &NoProgress,
            )
            .await
            .unwrap();

        assert!(evaluation.is_skipped());
        assert_eq!(evaluation.skip_reason, Some(SkipReason::Authentication));
        assert!(
            evaluation
                .chunk_results
                .iter()
                .all(|r| r.failure_kind() == Some(ChunkFailureKind::Auth))
        );
    }

    #[tokio::test]
    async fn test_reevaluate_retries_only_requested_chunks() {
        let plan = plan_with(EvaluationParams::default());
        let first = Arc::new(ScriptedClient::new(
            "gpt-5",
            vec![
                Ok(chunk_response(&plan.chunks[0], [4, 6, 8, 5])),
                Err(GatewayError::Transport("reset".into())),
                Ok(chunk_response(&plan.chunks[2], [4, 6, 8, 5])),
                Ok(final_response("moderate", "high")),
            ],
        ));
        let previous = run(&plan, first).await;
        assert!(previous.has_chunk_errors());

        let second = Arc::new(ScriptedClient::new(
            "gpt-5",
            vec![
                Ok(chunk_response(&plan.chunks[1], [4, 6, 8, 5])),
                Ok(final_response("moderate", "high")),
            ],
        ));
        let retry: BTreeSet<usize> = [2].into_iter().collect();
        let evaluation = ModelEvaluationPipeline::new(&plan, &Unthrottled, &NoCallLogger)
            .reevaluate(
                &previous,
                &retry,
                Ok(Arc::clone(&second) as Arc<dyn ModelClient>),
                &NoProgress,
            )
            .await
            .unwrap();

        assert_eq!(second.call_count(), 2);
        assert!(evaluation.is_done());
        assert!(!evaluation.has_chunk_errors());
        assert_eq!(evaluation.merged.unwrap().questions_scored(), 18);
    }
}
