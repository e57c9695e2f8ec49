//! Navigation questions posed to every model

use crate::core::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of questions in the built-in catalogue
pub const QUESTION_COUNT: usize = 18;

/// Question identifier `Q1`..`QN` (Value Object)
///
/// Serialized as its display form so it can key JSON objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuestionId(u8);

impl QuestionId {
    /// Create an id from its 1-based number
    pub fn new(number: u8) -> Result<Self, DomainError> {
        if number == 0 {
            return Err(DomainError::InvalidQuestion("Q0".to_string()));
        }
        Ok(Self(number))
    }

    pub fn number(&self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for QuestionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Q{}", self.0)
    }
}

impl std::str::FromStr for QuestionId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .trim()
            .strip_prefix(['Q', 'q'])
            .ok_or_else(|| DomainError::InvalidQuestion(s.to_string()))?;
        let number: u8 = digits
            .parse()
            .map_err(|_| DomainError::InvalidQuestion(s.to_string()))?;
        QuestionId::new(number).map_err(|_| DomainError::InvalidQuestion(s.to_string()))
    }
}

impl Serialize for QuestionId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for QuestionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A navigation question (Entity, immutable)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub title: String,
    /// Sub-topics the navigator should try to locate, in priority order
    pub focus_areas: Vec<String>,
}

const CATALOGUE: [(&str, [&str; 3]); QUESTION_COUNT] = [
    (
        "How is configuration layered across environments?",
        ["environment overrides", "default values", "secret handling"],
    ),
    (
        "How do services authenticate each other?",
        ["token issuance", "mutual TLS", "credential rotation"],
    ),
    (
        "Where is request retry and backoff policy defined?",
        ["retry budget", "exponential backoff", "idempotency"],
    ),
    (
        "How is schema migration coordinated with deployment?",
        ["migration ordering", "backward compatibility", "rollback"],
    ),
    (
        "What limits protect the system from overload?",
        ["rate limiting", "load shedding", "queue depth"],
    ),
    (
        "How are background jobs scheduled and recovered?",
        ["job scheduling", "dead letter queue", "at-least-once delivery"],
    ),
    (
        "How is caching invalidated after writes?",
        ["cache invalidation", "write-through", "time to live"],
    ),
    (
        "How are feature flags evaluated and rolled out?",
        ["flag evaluation", "gradual rollout", "kill switch"],
    ),
    (
        "What is the observability pipeline for traces and metrics?",
        ["distributed tracing", "metric aggregation", "sampling"],
    ),
    (
        "How does the system handle partial outages of a dependency?",
        ["circuit breaker", "graceful degradation", "fallback"],
    ),
    (
        "How is data partitioned across storage nodes?",
        ["sharding key", "rebalancing", "hot partitions"],
    ),
    (
        "How are consistency guarantees documented for reads?",
        ["read-your-writes", "eventual consistency", "quorum reads"],
    ),
    (
        "How is personally identifiable information protected?",
        ["encryption at rest", "data masking", "access auditing"],
    ),
    (
        "What is the release and rollback procedure?",
        ["canary release", "blue-green deployment", "rollback trigger"],
    ),
    (
        "How are on-call incidents triaged?",
        ["severity levels", "runbook", "postmortem"],
    ),
    (
        "How is capacity planned ahead of traffic growth?",
        ["load testing", "autoscaling", "capacity forecast"],
    ),
    (
        "How are API versions deprecated?",
        ["versioning scheme", "deprecation notice", "compatibility window"],
    ),
    (
        "How is cost attributed to teams and services?",
        ["cost allocation", "resource tagging", "budget alerts"],
    ),
];

impl Question {
    /// The full built-in question set, ordered `Q1`..`Q18`
    pub fn catalogue() -> Vec<Question> {
        CATALOGUE
            .iter()
            .enumerate()
            .map(|(i, (title, focus))| Question {
                id: QuestionId((i + 1) as u8),
                title: (*title).to_string(),
                focus_areas: focus.iter().map(|s| (*s).to_string()).collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_id_display_and_parse() {
        let id: QuestionId = "Q7".parse().unwrap();
        assert_eq!(id.number(), 7);
        assert_eq!(id.to_string(), "Q7");
        assert_eq!("q12".parse::<QuestionId>().unwrap().number(), 12);
    }

    #[test]
    fn test_question_id_rejects_garbage() {
        assert!("Q0".parse::<QuestionId>().is_err());
        assert!("7".parse::<QuestionId>().is_err());
        assert!("Qx".parse::<QuestionId>().is_err());
    }

    #[test]
    fn test_question_id_orders_numerically() {
        let q2: QuestionId = "Q2".parse().unwrap();
        let q10: QuestionId = "Q10".parse().unwrap();
        assert!(q2 < q10);
    }

    #[test]
    fn test_question_id_as_json_key() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(QuestionId::new(3).unwrap(), 1);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"Q3":1}"#);
        let back: std::collections::BTreeMap<QuestionId, i32> =
            serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn test_catalogue_has_eighteen_questions() {
        let questions = Question::catalogue();
        assert_eq!(questions.len(), QUESTION_COUNT);
        assert_eq!(questions[0].id.to_string(), "Q1");
        assert_eq!(questions[17].id.to_string(), "Q18");
        assert!(questions.iter().all(|q| !q.focus_areas.is_empty()));
    }
}
