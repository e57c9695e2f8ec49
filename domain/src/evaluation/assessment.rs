//! Final per-model assessment

use super::merge::MergedResult;
use super::profile::ProfileId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    #[default]
    Medium,
    Low,
}

impl std::str::FromStr for Confidence {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Confidence::High),
            "medium" | "moderate" => Ok(Confidence::Medium),
            "low" => Ok(Confidence::Low),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub best_for_production: ProfileId,
    pub confidence: Confidence,
    pub reasoning: String,
}

impl Recommendation {
    /// Extract `recommendation` from a final-assessment response.
    ///
    /// Only `best_for_production` is required; it must name a known profile.
    pub fn from_response(response: &Value) -> Option<Self> {
        let rec = response.get("recommendation")?;
        let best_for_production: ProfileId = rec
            .get("best_for_production")
            .and_then(Value::as_str)?
            .parse()
            .ok()?;
        let confidence: Confidence = rec
            .get("confidence")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();
        let reasoning = rec
            .get("reasoning")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Some(Self {
            best_for_production,
            confidence,
            reasoning,
        })
    }
}

/// Where a recommendation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentSource {
    /// The model's own holistic judgement
    Model,
    /// Deterministic argmax over totals after the final call failed
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalAssessment {
    pub model_id: String,
    pub totals: BTreeMap<ProfileId, u32>,
    pub questions_won: BTreeMap<ProfileId, u32>,
    pub recommendation: Recommendation,
    pub source: AssessmentSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

impl FinalAssessment {
    pub fn from_model(merged: &MergedResult, recommendation: Recommendation) -> Self {
        Self {
            model_id: merged.model_id.clone(),
            totals: merged.profile_totals.clone(),
            questions_won: merged.questions_won(),
            recommendation,
            source: AssessmentSource::Model,
            fallback_reason: None,
        }
    }

    /// Deterministic assessment: argmax of totals, low confidence.
    pub fn fallback(merged: &MergedResult, reason: impl Into<String>) -> Self {
        let best = merged.leader();
        let best_total = merged.profile_totals.get(&best).copied().unwrap_or(0);
        let runner_up = merged
            .profile_totals
            .iter()
            .filter(|(p, _)| **p != best)
            .max_by_key(|(_, t)| **t);

        let mut reasoning = format!(
            "Fallback selection: {} has the highest total score ({}) across {} scored questions",
            best,
            best_total,
            merged.questions_scored()
        );
        if let Some((profile, total)) = runner_up {
            reasoning.push_str(&format!(", ahead of {} ({})", profile, total));
        }
        if merged.chunk_errors {
            reasoning.push_str("; some chunks failed and their questions are not counted");
        }
        reasoning.push('.');

        Self {
            model_id: merged.model_id.clone(),
            totals: merged.profile_totals.clone(),
            questions_won: merged.questions_won(),
            recommendation: Recommendation {
                best_for_production: best,
                confidence: Confidence::Low,
                reasoning,
            },
            source: AssessmentSource::Fallback,
            fallback_reason: Some(reason.into()),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == AssessmentSource::Fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn merged_with_totals(totals: [u32; 4]) -> MergedResult {
        MergedResult {
            model_id: "model-a".into(),
            all_scores: BTreeMap::new(),
            profile_totals: ProfileId::ALL.iter().copied().zip(totals).collect(),
            chunk_errors: false,
            succeeded_chunks: vec![1, 2, 3],
            failed_chunks: vec![],
            integrity_violations: vec![],
        }
    }

    #[test]
    fn test_recommendation_from_response() {
        let response = json!({
            "recommendation": {
                "best_for_production": "moderate",
                "confidence": "High",
                "reasoning": "Best coverage of focus areas"
            }
        });
        let rec = Recommendation::from_response(&response).unwrap();
        assert_eq!(rec.best_for_production, ProfileId::Moderate);
        assert_eq!(rec.confidence, Confidence::High);
    }

    #[test]
    fn test_recommendation_requires_known_profile() {
        let response = json!({ "recommendation": { "best_for_production": "hybrid" } });
        assert!(Recommendation::from_response(&response).is_none());
        assert!(Recommendation::from_response(&json!({})).is_none());
    }

    #[test]
    fn test_recommendation_defaults_optional_fields() {
        let response = json!({ "recommendation": { "best_for_production": "current" } });
        let rec = Recommendation::from_response(&response).unwrap();
        assert_eq!(rec.confidence, Confidence::Medium);
        assert!(rec.reasoning.is_empty());
    }

    #[test]
    fn test_fallback_picks_argmax_with_low_confidence() {
        let merged = merged_with_totals([72, 98, 112, 108]);
        let assessment = FinalAssessment::fallback(&merged, "transport error");

        assert_eq!(assessment.recommendation.best_for_production, ProfileId::Moderate);
        assert_eq!(assessment.recommendation.confidence, Confidence::Low);
        assert!(assessment.recommendation.reasoning.contains("moderate"));
        assert!(assessment.recommendation.reasoning.contains("aggressive (108)"));
        assert!(assessment.is_fallback());
        assert_eq!(assessment.fallback_reason.as_deref(), Some("transport error"));
    }
}
