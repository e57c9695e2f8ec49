//! Chunk runner
//!
//! Sends one prompt per chunk, strictly in chunk order, with the rate
//! limiter acquired before every call. A failed chunk is recorded and the
//! runner moves on; only authentication or availability failures stop the
//! model, and the remaining chunks are then recorded as not attempted.

use crate::ports::call_logger::CallLogger;
use crate::ports::model_client::ModelClient;
use crate::ports::progress::ProgressNotifier;
use crate::ports::rate_limiter::RateLimiter;
use crate::use_cases::plan::EvaluationPlan;
use crate::use_cases::shared::{call_throttled, log_call};
use navigator_domain::{
    ChunkFailure, ChunkFailureKind, ChunkResult, ChunkSpec, PromptBuilder, SkipReason,
    validate_chunk_response,
};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Results of one pass over the chunks
#[derive(Debug, Clone)]
pub struct ChunkRunOutcome {
    /// One result per chunk, in chunk order
    pub results: Vec<ChunkResult>,
    /// Set when a failure ended the model's run early
    pub abort: Option<SkipReason>,
}

impl ChunkRunOutcome {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_ok()).count()
    }
}

pub struct ChunkRunner<'a> {
    plan: &'a EvaluationPlan,
    limiter: &'a dyn RateLimiter,
    logger: &'a dyn CallLogger,
    prompts: PromptBuilder,
}

impl<'a> ChunkRunner<'a> {
    pub fn new(
        plan: &'a EvaluationPlan,
        limiter: &'a dyn RateLimiter,
        logger: &'a dyn CallLogger,
    ) -> Self {
        Self {
            plan,
            limiter,
            logger,
            prompts: plan.params.prompt_builder(),
        }
    }

    /// Run every chunk not already present in `preserved`.
    ///
    /// Preserved results are carried over unchanged, so a retry only calls
    /// the chunks it was asked to re-run.
    pub async fn run(
        &self,
        client: &dyn ModelClient,
        preserved: &BTreeMap<usize, ChunkResult>,
        progress: &dyn ProgressNotifier,
    ) -> ChunkRunOutcome {
        let model = client.model();
        let mut results = Vec::with_capacity(self.plan.chunks.len());
        let mut abort: Option<SkipReason> = None;

        for chunk in &self.plan.chunks {
            if let Some(kept) = preserved.get(&chunk.chunk_index) {
                debug!("{}: keeping chunk {}", model, chunk.chunk_index);
                results.push(kept.clone());
                continue;
            }

            if let Some(reason) = abort {
                results.push(ChunkResult::failed(
                    model.as_str(),
                    chunk.chunk_index,
                    ChunkFailureKind::NotAttempted,
                    format!("not attempted: {}", reason),
                ));
                continue;
            }

            let result = self.run_chunk(client, chunk).await;
            progress.on_chunk_complete(model, chunk.chunk_index, result.is_ok());

            if let Some(reason) = result.failure_kind().and_then(|k| k.abort_reason()) {
                warn!(
                    "{}: stopping after chunk {} ({})",
                    model, chunk.chunk_index, reason
                );
                abort = Some(reason);
            }
            results.push(result);
        }

        ChunkRunOutcome { results, abort }
    }

    /// Run a single chunk: one throttled call, then shape validation.
    pub async fn run_chunk(&self, client: &dyn ModelClient, chunk: &ChunkSpec) -> ChunkResult {
        let model = client.model();
        let prompt = self
            .prompts
            .chunk_prompt(chunk, &self.plan.questions, &self.plan.summaries);
        debug!(
            "{}: chunk {} prompt is {} bytes",
            model,
            chunk.chunk_index,
            prompt.len()
        );

        let response = call_throttled(
            client,
            self.limiter,
            self.plan.params.call_timeout,
            &prompt,
            PromptBuilder::navigator_system(),
        )
        .await;

        let result = match response {
            Ok(value) => match validate_chunk_response(chunk, &value) {
                Ok(scores) => ChunkResult::ok(model.as_str(), chunk.chunk_index, scores),
                Err(e) => {
                    let failure = ChunkFailure::from(e);
                    ChunkResult::failed(
                        model.as_str(),
                        chunk.chunk_index,
                        failure.kind,
                        failure.message,
                    )
                }
            },
            Err(e) => ChunkResult::failed(
                model.as_str(),
                chunk.chunk_index,
                e.failure_kind(),
                e.to_string(),
            ),
        };

        match &result.error {
            None => info!("{}: chunk {} ok", model, chunk.chunk_index),
            Some(failure) => warn!(
                "{}: chunk {} failed ({}): {}",
                model, chunk.chunk_index, failure.kind, failure.message
            ),
        }
        log_call(
            self.logger,
            model.as_str(),
            Some(chunk.chunk_index),
            prompt.len(),
            result.error.as_ref().map(|e| e.message.clone()),
        );

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EvaluationParams;
    use crate::ports::call_logger::NoCallLogger;
    use crate::ports::model_client::GatewayError;
    use crate::ports::progress::NoProgress;
    use crate::ports::rate_limiter::{FixedIntervalLimiter, Unthrottled};
    use crate::use_cases::testing::{
        RecordingCallLogger, ScriptedClient, StaticProfiles, chunk_response,
    };
    use navigator_domain::ChunkStatus;
    use serde_json::json;
    use std::time::Duration;

    fn plan() -> EvaluationPlan {
        EvaluationPlan::prepare(EvaluationParams::default(), &StaticProfiles::new()).unwrap()
    }

    #[tokio::test]
    async fn test_all_chunks_succeed() {
        let plan = plan();
        let client = ScriptedClient::new(
            "gpt-5",
            plan.chunks
                .iter()
                .map(|c| Ok(chunk_response(c, [4, 6, 8, 5])))
                .collect(),
        );
        let runner = ChunkRunner::new(&plan, &Unthrottled, &NoCallLogger);
        let outcome = runner.run(&client, &BTreeMap::new(), &NoProgress).await;

        assert_eq!(outcome.results.len(), 3);
        assert_eq!(outcome.succeeded(), 3);
        assert!(outcome.abort.is_none());
        assert_eq!(client.call_count(), 3);
        // Chunk order is preserved
        let indices: Vec<usize> = outcome.results.iter().map(|r| r.chunk_index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_failed_chunk_does_not_stop_the_run() {
        let plan = plan();
        let client = ScriptedClient::new(
            "gpt-5",
            vec![
                Ok(chunk_response(&plan.chunks[0], [4, 6, 8, 5])),
                Err(GatewayError::Transport("connection reset".into())),
                Ok(chunk_response(&plan.chunks[2], [4, 6, 8, 5])),
            ],
        );
        let runner = ChunkRunner::new(&plan, &Unthrottled, &NoCallLogger);
        let outcome = runner.run(&client, &BTreeMap::new(), &NoProgress).await;

        assert_eq!(outcome.succeeded(), 2);
        assert_eq!(outcome.results[1].status, ChunkStatus::Error);
        assert_eq!(
            outcome.results[1].failure_kind(),
            Some(ChunkFailureKind::Transport)
        );
        assert!(outcome.results[2].is_ok());
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn test_wrong_questions_are_a_shape_failure() {
        let plan = plan();
        // Chunk 1 answers with chunk 2's questions
        let client = ScriptedClient::new(
            "gpt-5",
            vec![Ok(chunk_response(&plan.chunks[1], [4, 6, 8, 5]))],
        );
        let runner = ChunkRunner::new(&plan, &Unthrottled, &NoCallLogger);
        let result = runner.run_chunk(&client, &plan.chunks[0]).await;

        assert_eq!(result.failure_kind(), Some(ChunkFailureKind::Shape));
        assert!(result.scores.is_empty());
    }

    #[tokio::test]
    async fn test_missing_scores_is_a_parse_failure() {
        let plan = plan();
        let client = ScriptedClient::new("gpt-5", vec![Ok(json!({ "answer": "42" }))]);
        let runner = ChunkRunner::new(&plan, &Unthrottled, &NoCallLogger);
        let result = runner.run_chunk(&client, &plan.chunks[0]).await;

        assert_eq!(result.failure_kind(), Some(ChunkFailureKind::Parse));
    }

    #[tokio::test]
    async fn test_auth_failure_stops_remaining_chunks() {
        let plan = plan();
        let client = ScriptedClient::new(
            "gpt-5",
            vec![
                Ok(chunk_response(&plan.chunks[0], [4, 6, 8, 5])),
                Err(GatewayError::Auth("401 invalid key".into())),
            ],
        );
        let runner = ChunkRunner::new(&plan, &Unthrottled, &NoCallLogger);
        let outcome = runner.run(&client, &BTreeMap::new(), &NoProgress).await;

        assert_eq!(outcome.abort, Some(SkipReason::Authentication));
        assert_eq!(client.call_count(), 2);
        assert_eq!(
            outcome.results[2].failure_kind(),
            Some(ChunkFailureKind::NotAttempted)
        );
    }

    #[tokio::test]
    async fn test_preserved_results_are_not_called_again() {
        let plan = plan();
        let mut preserved = BTreeMap::new();
        for chunk in [&plan.chunks[0], &plan.chunks[2]] {
            preserved.insert(
                chunk.chunk_index,
                ChunkResult::ok("gpt-5", chunk.chunk_index, Default::default()),
            );
        }
        let client = ScriptedClient::new(
            "gpt-5",
            vec![Ok(chunk_response(&plan.chunks[1], [1, 2, 3, 4]))],
        );
        let runner = ChunkRunner::new(&plan, &Unthrottled, &NoCallLogger);
        let outcome = runner.run(&client, &preserved, &NoProgress).await;

        assert_eq!(client.call_count(), 1);
        assert!(client.prompts()[0].contains("Navigation chunk 2"));
        assert_eq!(outcome.succeeded(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_calls_are_spaced_by_the_limiter() {
        let plan = plan();
        let client = ScriptedClient::new(
            "gpt-5",
            plan.chunks
                .iter()
                .map(|c| Ok(chunk_response(c, [4, 6, 8, 5])))
                .collect(),
        );
        let limiter = FixedIntervalLimiter::new(Duration::from_secs(2));
        let runner = ChunkRunner::new(&plan, &limiter, &NoCallLogger);
        runner.run(&client, &BTreeMap::new(), &NoProgress).await;

        let times = client.call_times();
        assert_eq!(times.len(), 3);
        for pair in times.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_secs(2));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_call_times_out_as_transport_failure() {
        let params = EvaluationParams::default().with_call_timeout(Some(Duration::from_secs(5)));
        let plan = EvaluationPlan::prepare(params, &StaticProfiles::new()).unwrap();
        let client = ScriptedClient::new(
            "gpt-5",
            vec![Ok(chunk_response(&plan.chunks[0], [4, 6, 8, 5]))],
        )
        .with_latency(Duration::from_secs(60));
        let runner = ChunkRunner::new(&plan, &Unthrottled, &NoCallLogger);
        let result = runner.run_chunk(&client, &plan.chunks[0]).await;

        assert_eq!(result.failure_kind(), Some(ChunkFailureKind::Transport));
        assert!(result.error.unwrap().message.contains("Timeout"));
    }

    #[tokio::test]
    async fn test_every_call_is_logged() {
        let plan = plan();
        let client = ScriptedClient::new(
            "gpt-5",
            vec![
                Ok(chunk_response(&plan.chunks[0], [4, 6, 8, 5])),
                Ok(json!({})),
            ],
        );
        let logger = RecordingCallLogger::default();
        let runner = ChunkRunner::new(&plan, &Unthrottled, &logger);
        runner.run(&client, &BTreeMap::new(), &NoProgress).await;

        let events = logger.events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].0, "chunk_call");
        assert_eq!(events[0].1["status"], "ok");
        assert_eq!(events[0].1["chunk"], 1);
        assert_eq!(events[1].1["status"], "error");
        assert!(events[1].1["prompt_bytes"].as_u64().unwrap() > 0);
    }
}
