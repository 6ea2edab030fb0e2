//! Verification policy
//!
//! Pure decision over a guide's rating totals and feedback coverage. Averages
//! are integer fixed-point values scaled by [`AVERAGE_SCALE`], computed with
//! floor division:
//!
//! 1. fewer than `min_total_ratings` ratings -> unverified
//! 2. any authored feedback entry without ratings -> unverified
//! 3. every per-metric average `>= min_metric_average` and the overall
//!    average `>= min_overall_average` -> verified, otherwise unverified

use crate::feedback_store::Coverage;
use crate::types::{RatingTotals, ReputationConfig, AVERAGE_SCALE};
use serde::{Deserialize, Serialize};

/// Fixed-point averages (3.000 == 3000)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedPointAverages {
    pub expertise: u64,
    pub help: u64,
    pub recommend: u64,
    pub overall: u64,
}

impl FixedPointAverages {
    /// `None` when no ratings have been received
    pub fn from_totals(totals: &RatingTotals) -> Option<Self> {
        if totals.ratings == 0 {
            return None;
        }

        let n = totals.ratings;
        let sum = totals.expertise + totals.help + totals.recommend;
        Some(Self {
            expertise: totals.expertise * AVERAGE_SCALE / n,
            help: totals.help * AVERAGE_SCALE / n,
            recommend: totals.recommend * AVERAGE_SCALE / n,
            overall: sum * AVERAGE_SCALE / (n * 3),
        })
    }
}

/// Why a guide was or was not verified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Verified(FixedPointAverages),
    InsufficientRatings { have: u64, need: u64 },
    UnratedFeedback { unrated: usize },
    BelowThreshold(FixedPointAverages),
}

impl Decision {
    pub fn is_verified(&self) -> bool {
        matches!(self, Decision::Verified(_))
    }
}

/// Thresholds the evaluator applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationEvaluator {
    min_total_ratings: u64,
    min_metric_average: u64,
    min_overall_average: u64,
}

impl Default for VerificationEvaluator {
    fn default() -> Self {
        Self::from_config(&ReputationConfig::default())
    }
}

impl VerificationEvaluator {
    pub fn from_config(config: &ReputationConfig) -> Self {
        Self {
            min_total_ratings: config.min_total_ratings,
            min_metric_average: config.min_metric_average,
            min_overall_average: config.min_overall_average,
        }
    }

    /// Decide from scratch; the result replaces any previous state
    pub fn evaluate(&self, totals: &RatingTotals, coverage: &Coverage) -> Decision {
        if totals.ratings < self.min_total_ratings {
            return Decision::InsufficientRatings {
                have: totals.ratings,
                need: self.min_total_ratings,
            };
        }

        if !coverage.is_complete() {
            return Decision::UnratedFeedback {
                unrated: coverage.unrated,
            };
        }

        let averages = match FixedPointAverages::from_totals(totals) {
            Some(averages) => averages,
            None => {
                return Decision::InsufficientRatings {
                    have: 0,
                    need: self.min_total_ratings,
                }
            }
        };

        let metrics_pass = [averages.expertise, averages.help, averages.recommend]
            .iter()
            .all(|avg| *avg >= self.min_metric_average);

        if metrics_pass && averages.overall >= self.min_overall_average {
            Decision::Verified(averages)
        } else {
            Decision::BelowThreshold(averages)
        }
    }
}
