//! Evaluation plan
//!
//! Everything a run needs before the first remote call: validated
//! parameters, the question set, its chunk partition, and the profile data.
//! Building the plan is where configuration errors surface.

use crate::config::EvaluationParams;
use crate::ports::profile_data::ProfileDataSource;
use navigator_domain::{ChunkSpec, DomainError, ProfileId, ProfileSummary, Question};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct EvaluationPlan {
    pub params: EvaluationParams,
    pub questions: Vec<Question>,
    pub chunks: Vec<ChunkSpec>,
    pub summaries: Vec<ProfileSummary>,
}

impl EvaluationPlan {
    pub fn prepare(
        params: EvaluationParams,
        data: &dyn ProfileDataSource,
    ) -> Result<Self, DomainError> {
        params.validate()?;

        let questions = Question::catalogue();
        let chunks = ChunkSpec::partition(questions.len(), params.chunk_size)?;

        let summaries = ProfileId::ALL
            .iter()
            .map(|profile| {
                data.load(*profile)
                    .map_err(|e| DomainError::config(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "Plan: {} questions in {} chunks, {} profiles loaded",
            questions.len(),
            chunks.len(),
            summaries.len()
        );

        Ok(Self {
            params,
            questions,
            chunks,
            summaries,
        })
    }

    /// Remote calls for one full model pass: every chunk plus the final call.
    pub fn calls_per_model(&self) -> usize {
        self.chunks.len() + 1
    }
}
