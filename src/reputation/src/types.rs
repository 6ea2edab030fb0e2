//! Common types for guides, feedback and ratings

use crate::error::{ReputationError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Reward amount in smallest token unit
pub type Amount = u64;

/// Position of a feedback entry in the append-only log (zero-based)
pub type FeedbackId = u64;

/// Fixed-point scale used for all averages (3.000 is stored as 3000)
pub const AVERAGE_SCALE: u64 = 1000;

/// Minimum number of received ratings before a guide can be verified
pub const MIN_TOTAL_RATINGS: u64 = 10;

/// Minimum per-metric average (scaled by [`AVERAGE_SCALE`])
pub const MIN_METRIC_AVERAGE: u64 = 3000;

/// Minimum overall average (scaled by [`AVERAGE_SCALE`])
pub const MIN_OVERALL_AVERAGE: u64 = 4000;

/// Credit issued on every unverified -> verified transition
pub const FIXED_REWARD: Amount = 100;

/// Lowest accepted rating component
pub const MIN_SCORE: u8 = 1;

/// Highest accepted rating component
pub const MAX_SCORE: u8 = 5;

/// Opaque account reference supplied by the host
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Identity(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(s: &str) -> Self {
        Identity(s.to_string())
    }
}

impl From<String> for Identity {
    fn from(s: String) -> Self {
        Identity(s)
    }
}

/// The three rating components, each in `[1, 5]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub expertise: u8,
    pub help: u8,
    pub recommend: u8,
}

impl Scores {
    pub fn new(expertise: u8, help: u8, recommend: u8) -> Self {
        Self {
            expertise,
            help,
            recommend,
        }
    }

    /// True when every component lies in `[MIN_SCORE, MAX_SCORE]`
    pub fn in_range(&self) -> bool {
        [self.expertise, self.help, self.recommend]
            .iter()
            .all(|s| (MIN_SCORE..=MAX_SCORE).contains(s))
    }
}

impl fmt::Display for Scores {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.expertise, self.help, self.recommend)
    }
}

/// A single recorded rating (immutable once stored)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub rater: Identity,
    pub scores: Scores,
}

/// Running sums of the ratings a guide has received
///
/// Each sum has exactly `ratings` terms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingTotals {
    pub expertise: u64,
    pub help: u64,
    pub recommend: u64,
    pub ratings: u64,
}

impl RatingTotals {
    pub(crate) fn add(&mut self, scores: &Scores) {
        self.expertise += u64::from(scores.expertise);
        self.help += u64::from(scores.help);
        self.recommend += u64::from(scores.recommend);
        self.ratings += 1;
    }
}

/// Per-identity guide record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guide {
    /// Number of feedback entries authored
    pub feedback_count: u64,

    /// Externally administered counter, unrelated to verification
    pub match_count: u64,

    /// Current verification state (single source of truth for status)
    pub is_verified: bool,

    /// Sums of received rating components
    pub totals: RatingTotals,
}

impl Guide {
    /// Derived human-readable status, never stored
    pub fn status(&self, min_total_ratings: u64) -> GuideStatus {
        if self.is_verified {
            GuideStatus::FormalGuide
        } else if self.totals.ratings >= min_total_ratings {
            GuideStatus::Almost
        } else {
            GuideStatus::InProgress
        }
    }
}

/// Human-readable guide status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuideStatus {
    #[serde(rename = "In progress")]
    InProgress,

    #[serde(rename = "Almost")]
    Almost,

    #[serde(rename = "Formal Guide")]
    FormalGuide,
}

impl GuideStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuideStatus::InProgress => "In progress",
            GuideStatus::Almost => "Almost",
            GuideStatus::FormalGuide => "Formal Guide",
        }
    }
}

impl fmt::Display for GuideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Feedback entry in the append-only log
///
/// The rater set is not serialized; it is rebuilt from `ratings` on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "StoredFeedbackEntry")]
pub struct FeedbackEntry {
    pub id: FeedbackId,
    pub author: Identity,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub ratings: Vec<Rating>,

    /// Raters that already rated this entry; one rating per rater
    #[serde(skip)]
    pub(crate) raters: HashSet<Identity>,
}

impl FeedbackEntry {
    pub(crate) fn new(id: FeedbackId, author: Identity, content: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            author,
            content,
            timestamp,
            ratings: Vec::new(),
            raters: HashSet::new(),
        }
    }

    pub fn rating_count(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_rated(&self) -> bool {
        !self.ratings.is_empty()
    }
}

#[derive(Deserialize)]
struct StoredFeedbackEntry {
    id: FeedbackId,
    author: Identity,
    content: String,
    timestamp: DateTime<Utc>,
    #[serde(default)]
    ratings: Vec<Rating>,
}

impl From<StoredFeedbackEntry> for FeedbackEntry {
    fn from(stored: StoredFeedbackEntry) -> Self {
        let raters = stored.ratings.iter().map(|r| r.rater.clone()).collect();
        Self {
            id: stored.id,
            author: stored.author,
            content: stored.content,
            timestamp: stored.timestamp,
            ratings: stored.ratings,
            raters,
        }
    }
}

/// Public view of a feedback entry returned by queries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackView {
    pub author: Identity,
    pub content: String,
    pub rating_count: usize,
    pub timestamp: DateTime<Utc>,
}

impl From<&FeedbackEntry> for FeedbackView {
    fn from(entry: &FeedbackEntry) -> Self {
        Self {
            author: entry.author.clone(),
            content: entry.content.clone(),
            rating_count: entry.rating_count(),
            timestamp: entry.timestamp,
        }
    }
}

/// Reward record kept by the issuer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    /// Unique reward ID
    pub id: uuid::Uuid,

    /// Guide receiving the reward
    pub guide: Identity,

    /// Amount credited
    pub amount: Amount,

    /// When the reward was issued
    pub issued_at: DateTime<Utc>,
}

/// Ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReputationConfig {
    /// Identity allowed to run administrative operations
    pub admin: Identity,

    /// Ratings required before verification is considered (default: 10)
    pub min_total_ratings: u64,

    /// Per-metric floor, scaled by 1000 (default: 3000)
    pub min_metric_average: u64,

    /// Overall floor, scaled by 1000 (default: 4000)
    pub min_overall_average: u64,

    /// Credit per rising verification edge (default: 100)
    pub reward_amount: Amount,

    /// Guides created already verified when the ledger is built
    #[serde(default)]
    pub founding_guides: Vec<Identity>,
}

impl Default for ReputationConfig {
    fn default() -> Self {
        Self {
            admin: Identity::from("admin"),
            min_total_ratings: MIN_TOTAL_RATINGS,
            min_metric_average: MIN_METRIC_AVERAGE,
            min_overall_average: MIN_OVERALL_AVERAGE,
            reward_amount: FIXED_REWARD,
            founding_guides: Vec::new(),
        }
    }
}

impl ReputationConfig {
    /// Check thresholds and founding guides
    ///
    /// Averages must be reachable with `[1, 5]` scores. The admin cannot be a
    /// founding guide and founding guides must be distinct.
    pub fn validate(&self) -> Result<()> {
        if self.admin.as_str().trim().is_empty() {
            return Err(invalid("admin must not be empty".to_string()));
        }

        if self.min_total_ratings == 0 {
            return Err(invalid("min_total_ratings must be at least 1".to_string()));
        }

        let range = u64::from(MIN_SCORE) * AVERAGE_SCALE..=u64::from(MAX_SCORE) * AVERAGE_SCALE;
        if !range.contains(&self.min_metric_average) {
            return Err(invalid(format!(
                "min_metric_average must be within {}..={}",
                range.start(),
                range.end()
            )));
        }
        if !range.contains(&self.min_overall_average) {
            return Err(invalid(format!(
                "min_overall_average must be within {}..={}",
                range.start(),
                range.end()
            )));
        }

        let mut seen = HashSet::new();
        for founder in &self.founding_guides {
            if founder == &self.admin {
                return Err(invalid(format!(
                    "admin {} cannot also be a founding guide",
                    founder
                )));
            }
            if !seen.insert(founder) {
                return Err(invalid(format!("founding guide {} listed twice", founder)));
            }
        }

        Ok(())
    }
}

fn invalid(reason: String) -> ReputationError {
    ReputationError::InvalidConfig(reason)
}
