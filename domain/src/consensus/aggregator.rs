//! Consensus aggregation over completed model evaluations

use crate::evaluation::profile::ProfileId;
use crate::evaluation::state::ModelEvaluation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cross-model agreement on the best profile
///
/// # Example
///
/// ```
/// use navigator_domain::consensus::ConsensusReport;
/// use navigator_domain::ProfileId;
///
/// let report = ConsensusReport::from_votes([
///     ProfileId::Moderate,
///     ProfileId::Moderate,
///     ProfileId::Current,
/// ]);
/// assert_eq!(report.winner, Some(ProfileId::Moderate));
/// assert!((report.agreement_ratio - 2.0 / 3.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusReport {
    /// Votes per profile; every profile is present, zero when unvoted
    pub votes: BTreeMap<ProfileId, u32>,
    /// `max(votes) / models_counted`, 0.0 when no model completed
    pub agreement_ratio: f64,
    /// Number of DONE models that voted
    pub models_counted: usize,
    /// Profile with the most votes, `None` on a tie or with no votes
    pub winner: Option<ProfileId>,
}

impl ConsensusReport {
    pub fn from_votes(votes: impl IntoIterator<Item = ProfileId>) -> Self {
        let mut tally: BTreeMap<ProfileId, u32> = ProfileId::ALL.iter().map(|p| (*p, 0)).collect();
        let mut models_counted = 0;
        for profile in votes {
            *tally.entry(profile).or_default() += 1;
            models_counted += 1;
        }

        let max_votes = tally.values().copied().max().unwrap_or(0);
        let agreement_ratio = if models_counted == 0 {
            0.0
        } else {
            f64::from(max_votes) / models_counted as f64
        };

        let mut leaders = tally.iter().filter(|(_, v)| **v == max_votes && max_votes > 0);
        let winner = match (leaders.next(), leaders.next()) {
            (Some((profile, _)), None) => Some(*profile),
            _ => None,
        };

        Self {
            votes: tally,
            agreement_ratio,
            models_counted,
            winner,
        }
    }

    /// Every counted model voted the same way
    pub fn is_unanimous(&self) -> bool {
        self.models_counted > 0 && self.agreement_ratio >= 1.0
    }
}

impl Default for ConsensusReport {
    fn default() -> Self {
        Self::from_votes(std::iter::empty())
    }
}

/// Combines per-model recommendations into a [`ConsensusReport`]
pub struct CrossModelAggregator;

impl CrossModelAggregator {
    /// Only `DONE` evaluations vote; anything else is ignored.
    pub fn aggregate<'a>(
        evaluations: impl IntoIterator<Item = &'a ModelEvaluation>,
    ) -> ConsensusReport {
        ConsensusReport::from_votes(evaluations.into_iter().filter_map(|e| {
            if !e.is_done() {
                return None;
            }
            e.final_assessment
                .as_ref()
                .map(|a| a.recommendation.best_for_production)
        }))
    }
}
