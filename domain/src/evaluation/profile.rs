//! Extraction profiles under evaluation

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Identifier of one keyword-extraction configuration (Value Object)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileId {
    Baseline,
    Current,
    Moderate,
    Aggressive,
}

impl ProfileId {
    /// All profiles in their canonical order.
    ///
    /// The order is also the tie-break order wherever a single winner is needed.
    pub const ALL: [ProfileId; 4] = [
        ProfileId::Baseline,
        ProfileId::Current,
        ProfileId::Moderate,
        ProfileId::Aggressive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileId::Baseline => "baseline",
            ProfileId::Current => "current",
            ProfileId::Moderate => "moderate",
            ProfileId::Aggressive => "aggressive",
        }
    }
}

impl std::fmt::Display for ProfileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProfileId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "baseline" => Ok(ProfileId::Baseline),
            "current" => Ok(ProfileId::Current),
            "moderate" => Ok(ProfileId::Moderate),
            "aggressive" => Ok(ProfileId::Aggressive),
            other => Err(DomainError::UnknownProfile(other.to_string())),
        }
    }
}

/// Tuning parameters of the upstream extraction step for one profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionParams {
    /// Keywords kept per chapter
    pub top_n: u32,
    /// Minimum corpus frequency for a term to survive
    pub min_frequency: u32,
    /// Longest n-gram considered
    pub max_ngram: u8,
    /// MMR diversity weight (0.0 = pure relevance)
    pub diversity: f32,
}

/// One extraction profile (Entity, immutable once loaded)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub params: ExtractionParams,
}

impl Profile {
    pub fn new(id: ProfileId, params: ExtractionParams) -> Self {
        Self { id, params }
    }

    /// Built-in parameters for each profile
    pub fn defaults(id: ProfileId) -> Self {
        let params = match id {
            ProfileId::Baseline => ExtractionParams {
                top_n: 10,
                min_frequency: 1,
                max_ngram: 1,
                diversity: 0.0,
            },
            ProfileId::Current => ExtractionParams {
                top_n: 15,
                min_frequency: 2,
                max_ngram: 2,
                diversity: 0.3,
            },
            ProfileId::Moderate => ExtractionParams {
                top_n: 25,
                min_frequency: 2,
                max_ngram: 3,
                diversity: 0.5,
            },
            ProfileId::Aggressive => ExtractionParams {
                top_n: 40,
                min_frequency: 1,
                max_ngram: 3,
                diversity: 0.7,
            },
        };
        Self::new(id, params)
    }

    /// All four profiles with built-in parameters
    pub fn catalogue() -> Vec<Profile> {
        ProfileId::ALL.iter().map(|id| Self::defaults(*id)).collect()
    }
}

/// One keyword in a profile's aggregate data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordEntry {
    pub term: String,
    #[serde(default)]
    pub frequency: u32,
}

/// Aggregate keyword data produced by one profile over the knowledge base
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub profile: ProfileId,
    #[serde(default)]
    pub document_count: u32,
    pub keywords: Vec<KeywordEntry>,
}

impl ProfileSummary {
    /// Keywords by descending frequency, ties by term
    pub fn ranked_keywords(&self) -> Vec<&KeywordEntry> {
        let mut ranked: Vec<&KeywordEntry> = self.keywords.iter().collect();
        ranked.sort_by(|a, b| b.frequency.cmp(&a.frequency).then_with(|| a.term.cmp(&b.term)));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_id_parse() {
        assert_eq!("moderate".parse::<ProfileId>().unwrap(), ProfileId::Moderate);
        assert_eq!(" Aggressive ".parse::<ProfileId>().unwrap(), ProfileId::Aggressive);
        assert!("extreme".parse::<ProfileId>().is_err());
    }

    #[test]
    fn test_profile_id_serde_is_lowercase() {
        let json = serde_json::to_string(&ProfileId::Baseline).unwrap();
        assert_eq!(json, "\"baseline\"");
        let parsed: ProfileId = serde_json::from_str("\"current\"").unwrap();
        assert_eq!(parsed, ProfileId::Current);
    }

    #[test]
    fn test_catalogue_covers_all_profiles() {
        let ids: Vec<_> = Profile::catalogue().iter().map(|p| p.id).collect();
        assert_eq!(ids, ProfileId::ALL.to_vec());
    }

    #[test]
    fn test_ranked_keywords_are_deterministic() {
        let summary = ProfileSummary {
            profile: ProfileId::Current,
            document_count: 3,
            keywords: vec![
                KeywordEntry { term: "retry".into(), frequency: 4 },
                KeywordEntry { term: "backoff".into(), frequency: 4 },
                KeywordEntry { term: "cache".into(), frequency: 9 },
            ],
        };
        let terms: Vec<_> = summary.ranked_keywords().iter().map(|k| k.term.as_str()).collect();
        assert_eq!(terms, vec!["cache", "backoff", "retry"]);
    }
}
