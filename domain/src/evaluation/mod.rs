//! Navigator evaluation domain
//!
//! A fixed question set is partitioned into chunks; each model scores every
//! chunk against the four extraction profiles. Chunk results are validated,
//! merged into one table per model, and turned into a final recommendation.
//!
//! ```text
//! ChunkSpec ──► ChunkResult* ──► MergedResult ──► FinalAssessment
//!                    (scores)        (ScoreMerger)     (model or fallback)
//! ```

pub mod assessment;
pub mod chunk;
pub mod merge;
pub mod parsing;
pub mod profile;
pub mod question;
pub mod report;
pub mod scores;
pub mod state;

pub use assessment::{AssessmentSource, Confidence, FinalAssessment, Recommendation};
pub use chunk::{ChunkSpec, DEFAULT_CHUNK_SIZE};
pub use merge::{MergedResult, ScoreMerger};
pub use profile::{ExtractionParams, KeywordEntry, Profile, ProfileId, ProfileSummary};
pub use question::{QUESTION_COUNT, Question, QuestionId};
pub use report::{EvaluationReport, RunSettings, SkippedModel};
pub use scores::{
    ChunkFailure, ChunkFailureKind, ChunkResult, ChunkScores, ChunkStatus, ProfileScore,
    ScoreValidationError, validate_chunk_response,
};
pub use state::{ModelEvaluation, PipelineState, SkipReason};
