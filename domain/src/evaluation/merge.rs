//! Merging chunk results into one score table per model

use super::profile::ProfileId;
use super::question::QuestionId;
use super::scores::ChunkResult;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// Merged score table for one model
///
/// `profile_totals[p]` is the sum of `all_scores[q][p]` over exactly the
/// questions present in `all_scores`, i.e. the questions of succeeded chunks.
/// Questions of failed chunks are absent, never zero-filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedResult {
    pub model_id: String,
    pub all_scores: BTreeMap<QuestionId, BTreeMap<ProfileId, u8>>,
    pub profile_totals: BTreeMap<ProfileId, u32>,
    /// At least one chunk failed
    pub chunk_errors: bool,
    pub succeeded_chunks: Vec<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_chunks: Vec<usize>,
    /// Questions that a later chunk tried to write a second time
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub integrity_violations: Vec<QuestionId>,
}

impl MergedResult {
    /// Profile with the highest total; ties go to the earlier profile in
    /// [`ProfileId::ALL`] order.
    pub fn leader(&self) -> ProfileId {
        argmax(&self.profile_totals)
    }

    /// Per profile, the number of questions it won outright.
    ///
    /// A question whose top score is shared counts for nobody.
    pub fn questions_won(&self) -> BTreeMap<ProfileId, u32> {
        let mut won: BTreeMap<ProfileId, u32> = ProfileId::ALL.iter().map(|p| (*p, 0)).collect();
        for scores in self.all_scores.values() {
            let Some(top) = scores.values().max() else {
                continue;
            };
            let mut leaders = scores.iter().filter(|(_, s)| *s == top);
            if let (Some((profile, _)), None) = (leaders.next(), leaders.next()) {
                *won.entry(*profile).or_default() += 1;
            }
        }
        won
    }

    pub fn questions_scored(&self) -> usize {
        self.all_scores.len()
    }
}

/// Highest-valued profile with canonical-order tie-break.
pub fn argmax(totals: &BTreeMap<ProfileId, u32>) -> ProfileId {
    let mut best = ProfileId::ALL[0];
    let mut best_total = totals.get(&best).copied().unwrap_or(0);
    for profile in &ProfileId::ALL[1..] {
        let total = totals.get(profile).copied().unwrap_or(0);
        if total > best_total {
            best = *profile;
            best_total = total;
        }
    }
    best
}

/// Combines a model's chunk results
pub struct ScoreMerger;

impl ScoreMerger {
    /// Merge ordered chunk results for one model.
    ///
    /// Returns `None` when no chunk succeeded: the model has nothing to assess.
    pub fn merge(model_id: &str, results: &[ChunkResult]) -> Option<MergedResult> {
        let mut all_scores: BTreeMap<QuestionId, BTreeMap<ProfileId, u8>> = BTreeMap::new();
        let mut succeeded = BTreeSet::new();
        let mut failed = BTreeSet::new();
        let mut violations = Vec::new();

        for result in results {
            if !result.is_ok() {
                failed.insert(result.chunk_index);
                continue;
            }
            succeeded.insert(result.chunk_index);

            for (question, per_profile) in &result.scores {
                if all_scores.contains_key(question) {
                    warn!(
                        model = model_id,
                        chunk = result.chunk_index,
                        question = %question,
                        "Merge integrity violation: question already merged, keeping first value"
                    );
                    violations.push(*question);
                    continue;
                }
                all_scores.insert(
                    *question,
                    per_profile.iter().map(|(p, s)| (*p, s.score)).collect(),
                );
            }
        }

        if succeeded.is_empty() {
            return None;
        }

        let mut profile_totals: BTreeMap<ProfileId, u32> =
            ProfileId::ALL.iter().map(|p| (*p, 0)).collect();
        for scores in all_scores.values() {
            for (profile, score) in scores {
                *profile_totals.entry(*profile).or_default() += u32::from(*score);
            }
        }

        Some(MergedResult {
            model_id: model_id.to_string(),
            all_scores,
            profile_totals,
            chunk_errors: !failed.is_empty(),
            succeeded_chunks: succeeded.into_iter().collect(),
            failed_chunks: failed.into_iter().collect(),
            integrity_violations: violations,
        })
    }
}
