//! Final assessor
//!
//! Asks the model for a production recommendation based on its own merged
//! scores. Any failure of that call, or an unusable answer, falls back to a
//! deterministic argmax over the totals with low confidence. This step
//! never fails a model.

use crate::ports::call_logger::CallLogger;
use crate::ports::model_client::ModelClient;
use crate::ports::rate_limiter::RateLimiter;
use crate::use_cases::shared::{call_throttled, log_call};
use navigator_domain::{FinalAssessment, MergedResult, PromptBuilder, Recommendation};
use std::time::Duration;
use tracing::{info, warn};

pub struct FinalAssessor<'a> {
    limiter: &'a dyn RateLimiter,
    logger: &'a dyn CallLogger,
    prompts: PromptBuilder,
    call_timeout: Option<Duration>,
}

impl<'a> FinalAssessor<'a> {
    pub fn new(
        limiter: &'a dyn RateLimiter,
        logger: &'a dyn CallLogger,
        prompts: PromptBuilder,
        call_timeout: Option<Duration>,
    ) -> Self {
        Self {
            limiter,
            logger,
            prompts,
            call_timeout,
        }
    }

    pub async fn assess(&self, client: &dyn ModelClient, merged: &MergedResult) -> FinalAssessment {
        let model = client.model();
        let prompt = self.prompts.final_prompt(merged);

        let response = call_throttled(
            client,
            self.limiter,
            self.call_timeout,
            &prompt,
            PromptBuilder::assessor_system(),
        )
        .await;

        let (assessment, error) = match response {
            Ok(value) => match Recommendation::from_response(&value) {
                Some(recommendation) => (FinalAssessment::from_model(merged, recommendation), None),
                None => {
                    let reason = "response has no usable recommendation".to_string();
                    (FinalAssessment::fallback(merged, &reason), Some(reason))
                }
            },
            Err(e) => {
                let reason = e.to_string();
                (FinalAssessment::fallback(merged, &reason), Some(reason))
            }
        };

        match &error {
            None => info!(
                "{}: recommends {} ({})",
                model,
                assessment.recommendation.best_for_production,
                assessment.recommendation.confidence
            ),
            Some(reason) => warn!(
                "{}: final assessment failed ({}), falling back to {}",
                model, reason, assessment.recommendation.best_for_production
            ),
        }
        log_call(self.logger, model.as_str(), None, prompt.len(), error);

        assessment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::call_logger::NoCallLogger;
    use crate::ports::model_client::GatewayError;
    use crate::ports::rate_limiter::Unthrottled;
    use crate::use_cases::testing::{RecordingCallLogger, ScriptedClient, final_response};
    use navigator_domain::{
        AssessmentSource, ChunkResult, ChunkSpec, Confidence, ProfileId, ProfileScore,
        ScoreMerger,
    };
    use serde_json::json;

    fn merged(scores: [u8; 4]) -> MergedResult {
        let results: Vec<ChunkResult> = ChunkSpec::partition(18, 6)
            .unwrap()
            .iter()
            .map(|c| {
                let table = c
                    .question_ids
                    .iter()
                    .map(|q| {
                        let row = ProfileId::ALL
                            .iter()
                            .zip(scores)
                            .map(|(p, s)| (*p, ProfileScore::new(s)))
                            .collect();
                        (*q, row)
                    })
                    .collect();
                ChunkResult::ok("gpt-5", c.chunk_index, table)
            })
            .collect();
        ScoreMerger::merge("gpt-5", &results).unwrap()
    }

    fn assessor(logger: &dyn CallLogger) -> FinalAssessor<'_> {
        FinalAssessor::new(&Unthrottled, logger, PromptBuilder::default(), None)
    }

    #[tokio::test]
    async fn test_model_recommendation_is_used() {
        let client = ScriptedClient::new("gpt-5", vec![Ok(final_response("current", "high"))]);
        let assessment = assessor(&NoCallLogger)
            .assess(&client, &merged([3, 5, 9, 7]))
            .await;

        assert_eq!(assessment.source, AssessmentSource::Model);
        assert_eq!(
            assessment.recommendation.best_for_production,
            ProfileId::Current
        );
        assert_eq!(assessment.recommendation.confidence, Confidence::High);
        assert_eq!(assessment.totals[&ProfileId::Moderate], 162);
    }

    #[tokio::test]
    async fn test_transport_failure_falls_back_to_argmax() {
        let client = ScriptedClient::new(
            "gpt-5",
            vec![Err(GatewayError::Transport("503 overloaded".into()))],
        );
        let logger = RecordingCallLogger::default();
        let assessment = assessor(&logger).assess(&client, &merged([3, 5, 9, 7])).await;

        assert!(assessment.is_fallback());
        assert_eq!(
            assessment.recommendation.best_for_production,
            ProfileId::Moderate
        );
        assert_eq!(assessment.recommendation.confidence, Confidence::Low);
        assert!(
            assessment
                .fallback_reason
                .as_deref()
                .unwrap()
                .contains("503")
        );

        let events = logger.events();
        assert_eq!(events[0].0, "final_call");
        assert_eq!(events[0].1["chunk"], "final");
        assert_eq!(events[0].1["status"], "error");
    }

    #[tokio::test]
    async fn test_unparseable_recommendation_falls_back() {
        let client = ScriptedClient::new(
            "gpt-5",
            vec![Ok(json!({ "recommendation": { "best_for_production": "extreme" } }))],
        );
        let assessment = assessor(&NoCallLogger)
            .assess(&client, &merged([8, 2, 2, 2]))
            .await;

        assert!(assessment.is_fallback());
        assert_eq!(
            assessment.recommendation.best_for_production,
            ProfileId::Baseline
        );
    }

    #[tokio::test]
    async fn test_fallback_tie_uses_canonical_order() {
        let client = ScriptedClient::new("gpt-5", vec![Ok(json!({}))]);
        let assessment = assessor(&NoCallLogger)
            .assess(&client, &merged([2, 7, 7, 1]))
            .await;

        assert_eq!(
            assessment.recommendation.best_for_production,
            ProfileId::Current
        );
    }
}
