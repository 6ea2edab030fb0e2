//! Guide Reputation Ledger
//!
//! Tracks reputation for a population of guides:
//! - **Registry**: one record per guide identity
//! - **Feedback**: append-only log of feedback entries, each owning its ratings
//! - **Aggregation**: verified guides rate others' feedback on three 1-5 metrics
//! - **Verification**: deterministic promotion/demotion from fixed-point averages
//! - **Rewards**: a fixed credit on every unverified -> verified transition
//!
//! ## Verification Policy
//!
//! A guide is verified when it has at least 10 ratings, every feedback entry
//! it wrote has been rated at least once, each metric averages at least 3.000
//! and the overall average is at least 4.000. Averages use integer
//! arithmetic scaled by 1000 with floor division.

pub mod aggregator;
pub mod error;
pub mod evaluator;
pub mod events;
pub mod feedback_store;
pub mod ledger;
pub mod metrics;
pub mod registry;
pub mod reward_issuer;
pub mod shared;
pub mod types;

pub use aggregator::{RatingAggregator, RecordedRating};
pub use error::{ReputationError, Result};
pub use evaluator::{Decision, FixedPointAverages, VerificationEvaluator};
pub use events::{EventLog, EventSink, NullSink, ReputationEvent, TracingSink};
pub use feedback_store::{Coverage, FeedbackStore};
pub use ledger::{GuideSummary, LedgerStatistics, RatingOutcome, ReputationLedger};
pub use metrics::{gather_text, get_registry, register_metrics, ReputationMetrics};
pub use registry::GuideRegistry;
pub use reward_issuer::{RewardIssuer, RewardStatistics};
pub use shared::SharedLedger;
pub use types::{
    Amount, FeedbackEntry, FeedbackId, FeedbackView, Guide, GuideStatus, Identity, Rating,
    RatingTotals, ReputationConfig, Reward, Scores, AVERAGE_SCALE, FIXED_REWARD, MAX_SCORE,
    MIN_METRIC_AVERAGE, MIN_OVERALL_AVERAGE, MIN_SCORE, MIN_TOTAL_RATINGS,
};
