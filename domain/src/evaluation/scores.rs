//! Chunk score schema and validation
//!
//! A chunk response is accepted only when it scores exactly the chunk's
//! questions, each against all four profiles. Anything else is rejected
//! as a chunk failure instead of being partially merged.
//!
//! Expected response shape:
//!
//! ```json
//! {
//!   "scores": {
//!     "Q1": {
//!       "baseline":   { "found": ["..."], "missing": ["..."], "score": 6 },
//!       "current":    { "found": [], "missing": [], "score": 7 },
//!       "moderate":   { "found": [], "missing": [], "score": 8 },
//!       "aggressive": { "found": [], "missing": [], "score": 8 }
//!     }
//!   }
//! }
//! ```

use super::chunk::ChunkSpec;
use super::profile::ProfileId;
use super::question::QuestionId;
use super::state::SkipReason;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Highest score a navigator may award
pub const MAX_SCORE: u8 = 10;

/// One profile's navigation result for one question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileScore {
    /// Terms the navigator located in the profile's data
    #[serde(default)]
    pub found: Vec<String>,
    /// Terms the navigator looked for and could not locate
    #[serde(default)]
    pub missing: Vec<String>,
    /// 0..=10
    pub score: u8,
}

impl ProfileScore {
    pub fn new(score: u8) -> Self {
        Self {
            found: Vec::new(),
            missing: Vec::new(),
            score: score.min(MAX_SCORE),
        }
    }
}

/// Scores of one chunk: question → profile → result
pub type ChunkScores = BTreeMap<QuestionId, BTreeMap<ProfileId, ProfileScore>>;

/// Why a chunk response was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoreValidationError {
    /// Not the expected document at all (missing `scores` object)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Valid document with the wrong question/profile coverage or values
    #[error("Shape error: {0}")]
    Shape(String),
}

/// Validate a parsed response against the chunk it answers.
pub fn validate_chunk_response(
    chunk: &ChunkSpec,
    response: &Value,
) -> Result<ChunkScores, ScoreValidationError> {
    let scores = response
        .get("scores")
        .and_then(Value::as_object)
        .ok_or_else(|| ScoreValidationError::Parse("response has no `scores` object".into()))?;

    let mut parsed = ChunkScores::new();
    for (key, per_profile) in scores {
        let question: QuestionId = key
            .parse()
            .map_err(|_| ScoreValidationError::Shape(format!("unknown question key `{}`", key)))?;
        if !chunk.contains(&question) {
            return Err(ScoreValidationError::Shape(format!(
                "{} does not belong to chunk {}",
                question, chunk.chunk_index
            )));
        }
        if parsed
            .insert(question, validate_question(question, per_profile)?)
            .is_some()
        {
            return Err(ScoreValidationError::Shape(format!(
                "{} scored more than once",
                question
            )));
        }
    }

    let answered: BTreeSet<_> = parsed.keys().copied().collect();
    let missing: Vec<String> = chunk
        .question_ids
        .difference(&answered)
        .map(|q| q.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ScoreValidationError::Shape(format!(
            "missing questions: {}",
            missing.join(", ")
        )));
    }

    Ok(parsed)
}

fn validate_question(
    question: QuestionId,
    value: &Value,
) -> Result<BTreeMap<ProfileId, ProfileScore>, ScoreValidationError> {
    let object = value.as_object().ok_or_else(|| {
        ScoreValidationError::Shape(format!("{} is not an object of profiles", question))
    })?;

    let mut profiles = BTreeMap::new();
    for (key, entry) in object {
        let profile: ProfileId = key.parse().map_err(|_| {
            ScoreValidationError::Shape(format!("{}: unknown profile `{}`", question, key))
        })?;
        profiles.insert(profile, validate_profile_score(question, profile, entry)?);
    }

    if let Some(absent) = ProfileId::ALL.iter().find(|p| !profiles.contains_key(p)) {
        return Err(ScoreValidationError::Shape(format!(
            "{}: missing profile `{}`",
            question, absent
        )));
    }
    Ok(profiles)
}

fn validate_profile_score(
    question: QuestionId,
    profile: ProfileId,
    value: &Value,
) -> Result<ProfileScore, ScoreValidationError> {
    let shape = |msg: &str| ScoreValidationError::Shape(format!("{}/{}: {}", question, profile, msg));

    let object = value.as_object().ok_or_else(|| shape("not an object"))?;
    let raw = object.get("score").ok_or_else(|| shape("no score"))?;
    let score = match (raw.as_u64(), raw.as_f64()) {
        (Some(n), _) => n,
        (None, Some(f)) if f.fract() == 0.0 && f >= 0.0 => f as u64,
        _ => return Err(shape("score is not a non-negative integer")),
    };
    if score > MAX_SCORE as u64 {
        return Err(shape(&format!("score {} outside 0..={}", score, MAX_SCORE)));
    }

    Ok(ProfileScore {
        found: string_list(object.get("found")).ok_or_else(|| shape("`found` is not a list"))?,
        missing: string_list(object.get("missing"))
            .ok_or_else(|| shape("`missing` is not a list"))?,
        score: score as u8,
    })
}

/// Absent and null are empty; a bare string is a one-term list.
fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    match value {
        None | Some(Value::Null) => Some(Vec::new()),
        Some(Value::String(s)) => Some(vec![s.clone()]),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| v.as_str().map(str::to_string))
            .collect(),
        Some(_) => None,
    }
}

/// Outcome of one chunk call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkStatus {
    Ok,
    Error,
}

/// Classification of a chunk failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkFailureKind {
    Transport,
    Parse,
    Shape,
    Auth,
    ModelUnavailable,
    /// Not attempted because the model's run was aborted earlier
    NotAttempted,
}

impl ChunkFailureKind {
    /// Failures that end the model's run instead of a single chunk
    pub fn abort_reason(&self) -> Option<SkipReason> {
        match self {
            ChunkFailureKind::Auth => Some(SkipReason::Authentication),
            ChunkFailureKind::ModelUnavailable => Some(SkipReason::ModelUnavailable),
            _ => None,
        }
    }
}

impl std::fmt::Display for ChunkFailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ChunkFailureKind::Transport => "transport",
            ChunkFailureKind::Parse => "parse",
            ChunkFailureKind::Shape => "shape",
            ChunkFailureKind::Auth => "auth",
            ChunkFailureKind::ModelUnavailable => "model_unavailable",
            ChunkFailureKind::NotAttempted => "not_attempted",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkFailure {
    pub kind: ChunkFailureKind,
    pub message: String,
}

impl From<ScoreValidationError> for ChunkFailure {
    fn from(err: ScoreValidationError) -> Self {
        match err {
            ScoreValidationError::Parse(message) => ChunkFailure {
                kind: ChunkFailureKind::Parse,
                message,
            },
            ScoreValidationError::Shape(message) => ChunkFailure {
                kind: ChunkFailureKind::Shape,
                message,
            },
        }
    }
}

/// Recorded result of one chunk for one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkResult {
    pub model_id: String,
    pub chunk_index: usize,
    pub status: ChunkStatus,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub scores: ChunkScores,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ChunkFailure>,
}

impl ChunkResult {
    pub fn ok(model_id: impl Into<String>, chunk_index: usize, scores: ChunkScores) -> Self {
        Self {
            model_id: model_id.into(),
            chunk_index,
            status: ChunkStatus::Ok,
            scores,
            error: None,
        }
    }

    pub fn failed(
        model_id: impl Into<String>,
        chunk_index: usize,
        kind: ChunkFailureKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            chunk_index,
            status: ChunkStatus::Error,
            scores: ChunkScores::new(),
            error: Some(ChunkFailure {
                kind,
                message: message.into(),
            }),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ChunkStatus::Ok
    }

    pub fn failure_kind(&self) -> Option<ChunkFailureKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chunk() -> ChunkSpec {
        ChunkSpec::partition(4, 2).unwrap().remove(0)
    }

    fn full_question(score: u8) -> Value {
        json!({
            "baseline": { "found": ["retry"], "missing": ["backoff"], "score": score },
            "current": { "found": [], "missing": [], "score": score },
            "moderate": { "found": [], "missing": [], "score": score },
            "aggressive": { "found": [], "missing": [], "score": score }
        })
    }

    #[test]
    fn test_valid_response_is_accepted() {
        let response = json!({ "scores": { "Q1": full_question(7), "Q2": full_question(4) } });
        let scores = validate_chunk_response(&chunk(), &response).unwrap();

        assert_eq!(scores.len(), 2);
        let q1 = &scores[&"Q1".parse().unwrap()];
        assert_eq!(q1[&ProfileId::Baseline].score, 7);
        assert_eq!(q1[&ProfileId::Baseline].found, vec!["retry".to_string()]);
    }

    #[test]
    fn test_missing_scores_object_is_parse_error() {
        let err = validate_chunk_response(&chunk(), &json!({ "results": {} })).unwrap_err();
        assert!(matches!(err, ScoreValidationError::Parse(_)));
    }

    #[test]
    fn test_missing_question_is_shape_error() {
        let response = json!({ "scores": { "Q1": full_question(7) } });
        let err = validate_chunk_response(&chunk(), &response).unwrap_err();
        assert_eq!(err, ScoreValidationError::Shape("missing questions: Q2".into()));
    }

    #[test]
    fn test_foreign_question_is_shape_error() {
        let response = json!({
            "scores": { "Q1": full_question(7), "Q2": full_question(7), "Q3": full_question(7) }
        });
        let err = validate_chunk_response(&chunk(), &response).unwrap_err();
        assert!(matches!(err, ScoreValidationError::Shape(m) if m.contains("Q3")));
    }

    #[test]
    fn test_missing_profile_is_shape_error() {
        let mut q2 = full_question(5);
        q2.as_object_mut().unwrap().remove("moderate");
        let response = json!({ "scores": { "Q1": full_question(7), "Q2": q2 } });
        let err = validate_chunk_response(&chunk(), &response).unwrap_err();
        assert!(matches!(err, ScoreValidationError::Shape(m) if m.contains("moderate")));
    }

    #[test]
    fn test_unknown_profile_is_shape_error() {
        let mut q1 = full_question(5);
        q1.as_object_mut()
            .unwrap()
            .insert("extreme".into(), json!({ "score": 3 }));
        let response = json!({ "scores": { "Q1": q1, "Q2": full_question(7) } });
        assert!(validate_chunk_response(&chunk(), &response).is_err());
    }

    #[test]
    fn test_out_of_range_score_is_shape_error() {
        let response = json!({ "scores": { "Q1": full_question(11), "Q2": full_question(7) } });
        let err = validate_chunk_response(&chunk(), &response).unwrap_err();
        assert!(matches!(err, ScoreValidationError::Shape(m) if m.contains("outside")));
    }

    #[test]
    fn test_integral_float_score_is_accepted() {
        let mut q1 = full_question(5);
        q1["current"]["score"] = json!(8.0);
        let response = json!({ "scores": { "Q1": q1, "Q2": full_question(7) } });
        let scores = validate_chunk_response(&chunk(), &response).unwrap();
        assert_eq!(scores[&"Q1".parse().unwrap()][&ProfileId::Current].score, 8);
    }

    #[test]
    fn test_fractional_score_is_rejected() {
        let mut q1 = full_question(5);
        q1["current"]["score"] = json!(7.5);
        let response = json!({ "scores": { "Q1": q1, "Q2": full_question(7) } });
        assert!(validate_chunk_response(&chunk(), &response).is_err());
    }

    #[test]
    fn test_chunk_result_serializes_status_lowercase() {
        let failed = ChunkResult::failed("gpt-5", 2, ChunkFailureKind::Transport, "timeout");
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"]["kind"], "transport");
        assert!(json.get("scores").is_none());
        assert!(!failed.is_ok());
    }
}
