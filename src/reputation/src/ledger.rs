//! Reputation ledger
//!
//! Owns the guide registry, the feedback log and the reward issuer, and runs
//! every operation atomically: all preconditions are checked first, then all
//! mutations are applied, then the buffered notifications are delivered.
//! A rejected operation changes nothing and notifies no one.
//!
//! The ledger assumes its caller serializes operations (`&mut self`). Hosts
//! that cannot guarantee that should go through [`crate::SharedLedger`].

use crate::aggregator::RatingAggregator;
use crate::error::{ReputationError, Result};
use crate::evaluator::{Decision, FixedPointAverages, VerificationEvaluator};
use crate::events::{EventSink, NullSink, ReputationEvent};
use crate::feedback_store::FeedbackStore;
use crate::metrics::{self, ReputationMetrics};
use crate::registry::GuideRegistry;
use crate::reward_issuer::RewardIssuer;
use crate::types::{
    Amount, FeedbackEntry, FeedbackId, FeedbackView, Guide, GuideStatus, Identity, Rating,
    RatingTotals, ReputationConfig, Reward, Scores,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Snapshot of a guide with derived values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuideSummary {
    pub identity: Identity,
    pub feedback_count: u64,
    pub match_count: u64,
    pub is_verified: bool,
    pub status: GuideStatus,
    pub totals: RatingTotals,
    pub averages: Option<FixedPointAverages>,
    pub balance: Amount,
}

/// Result of a successful rating
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingOutcome {
    pub feedback_id: FeedbackId,
    pub author: Identity,

    /// Verification state of the author after re-evaluation
    pub verified: bool,

    /// True when the verification state flipped
    pub status_changed: bool,

    /// Reward issued on a rising edge
    pub reward: Option<Reward>,
}

/// Ledger-wide statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStatistics {
    pub total_guides: usize,
    pub verified_guides: usize,
    pub feedback_entries: u64,
    pub total_ratings: u64,
    pub rewards_issued: usize,
    pub reward_value: Amount,
}

pub struct ReputationLedger {
    config: Arc<ReputationConfig>,
    registry: GuideRegistry,
    feedback: FeedbackStore,
    aggregator: RatingAggregator,
    evaluator: VerificationEvaluator,
    rewards: RewardIssuer,
    sink: Arc<dyn EventSink>,
    metrics: Option<Arc<ReputationMetrics>>,
}

impl ReputationLedger {
    /// Create a ledger with default configuration and no event delivery
    pub fn new() -> Self {
        Self::assemble(ReputationConfig::default())
    }

    /// Create a ledger and appoint the configured founding guides
    ///
    /// Fails with `InvalidConfig` when the configuration does not validate.
    pub fn with_config(config: ReputationConfig) -> Result<Self> {
        config.validate()?;

        let mut ledger = Self::assemble(config);
        for founder in ledger.config.founding_guides.clone() {
            ledger.registry.insert_verified(&founder)?;
            info!(guide = %founder, "Founding guide appointed");
        }

        Ok(ledger)
    }

    fn assemble(config: ReputationConfig) -> Self {
        Self {
            evaluator: VerificationEvaluator::from_config(&config),
            rewards: RewardIssuer::new(config.reward_amount),
            registry: GuideRegistry::new(),
            feedback: FeedbackStore::new(),
            aggregator: RatingAggregator::new(),
            sink: Arc::new(NullSink),
            metrics: None,
            config: Arc::new(config),
        }
    }

    /// Deliver notifications to `sink`
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Record metrics into `metrics`
    pub fn with_metrics(mut self, metrics: Arc<ReputationMetrics>) -> Self {
        metrics
            .guides_tracked
            .set(self.registry.len() as i64);
        metrics
            .guides_verified
            .set(self.registry.verified_count() as i64);
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &ReputationConfig {
        &self.config
    }

    // === OPERATIONS ===

    /// Create a zeroed guide record for `identity`
    pub fn register(&mut self, identity: &Identity) -> Result<()> {
        self.registry
            .register(identity)
            .map_err(|e| self.rejected("register", e))?;

        info!(guide = %identity, "Guide registered");
        if let Some(m) = &self.metrics {
            metrics::record_guide_registered(m, self.registry.len());
        }
        self.sink.publish(&ReputationEvent::GuideRegistered {
            identity: identity.clone(),
        });
        Ok(())
    }

    /// Create an already verified guide; admin only
    ///
    /// The record starts verified, so there is no rising edge and no reward.
    pub fn appoint_founding_guide(&mut self, caller: &Identity, identity: &Identity) -> Result<()> {
        self.ensure_admin(caller)
            .and_then(|_| self.registry.insert_verified(identity))
            .map_err(|e| self.rejected("appoint_founding_guide", e))?;

        info!(guide = %identity, "Founding guide appointed");
        if let Some(m) = &self.metrics {
            metrics::record_guide_registered(m, self.registry.len());
            m.guides_verified.set(self.registry.verified_count() as i64);
        }
        self.sink.publish(&ReputationEvent::GuideRegistered {
            identity: identity.clone(),
        });
        Ok(())
    }

    /// Append a feedback entry authored by `author`
    pub fn submit_feedback(
        &mut self,
        author: &Identity,
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Result<FeedbackId> {
        let content = content.into();
        let feedback_id = self
            .feedback
            .submit(&mut self.registry, author, content.clone(), timestamp)
            .map_err(|e| self.rejected("submit_feedback", e))?;

        debug!(guide = %author, feedback_id, "Feedback submitted");
        if let Some(m) = &self.metrics {
            metrics::record_feedback_submitted(m, self.registry.len());
        }
        self.sink.publish(&ReputationEvent::FeedbackSubmitted {
            feedback_id,
            author: author.clone(),
            content,
        });
        Ok(feedback_id)
    }

    /// Record a rating by `rater` and re-evaluate the author
    pub fn rate_feedback(
        &mut self,
        feedback_id: FeedbackId,
        rater: &Identity,
        scores: Scores,
    ) -> Result<RatingOutcome> {
        let recorded = self
            .aggregator
            .rate(&mut self.registry, &mut self.feedback, feedback_id, rater, scores)
            .map_err(|e| self.rejected("rate_feedback", e))?;

        let author = recorded.author;
        let mut events = vec![ReputationEvent::FeedbackRated {
            feedback_id,
            author: author.clone(),
            rater: rater.clone(),
            scores,
        }];

        let coverage = self.feedback.coverage(&author);
        let decision = self.evaluator.evaluate(&recorded.author_totals, &coverage);
        let verified = decision.is_verified();
        let was_verified = self.registry.set_verified(&author, verified);
        let status_changed = was_verified != verified;

        debug!(
            guide = %author,
            feedback_id,
            rater = %rater,
            scores = %scores,
            decision = ?decision,
            "Feedback rated"
        );

        let mut reward = None;
        if status_changed {
            info!(guide = %author, verified, "Verification status changed");
            events.push(ReputationEvent::GuideStatusChanged {
                identity: author.clone(),
                verified,
            });

            if verified {
                let issued = self.rewards.issue(&author);
                info!(guide = %author, amount = issued.amount, reward_id = %issued.id, "Reward issued");
                events.push(ReputationEvent::RewardIssued {
                    identity: author.clone(),
                    amount: issued.amount,
                });
                reward = Some(issued);
            }
        }

        if let Some(m) = &self.metrics {
            metrics::record_rating(m, scores.expertise, scores.help, scores.recommend);
            if let Decision::Verified(avg) | Decision::BelowThreshold(avg) = decision {
                metrics::update_guide_average(m, author.as_str(), avg.overall);
            }
            if status_changed {
                metrics::record_verification_transition(m, verified, self.registry.verified_count());
            }
            if let Some(issued) = &reward {
                metrics::record_reward_issued(m, issued.amount);
            }
        }

        for event in &events {
            self.sink.publish(event);
        }

        Ok(RatingOutcome {
            feedback_id,
            author,
            verified,
            status_changed,
            reward,
        })
    }

    /// Overwrite a guide's match counter; admin only
    pub fn set_match_count(&mut self, caller: &Identity, identity: &Identity, count: u64) -> Result<()> {
        self.ensure_admin(caller)
            .and_then(|_| self.registry.set_match_count(identity, count))
            .map_err(|e| self.rejected("set_match_count", e))?;

        debug!(guide = %identity, count, "Match count set");
        Ok(())
    }

    fn ensure_admin(&self, caller: &Identity) -> Result<()> {
        if caller != &self.config.admin {
            return Err(ReputationError::Unauthorized(caller.clone()));
        }
        Ok(())
    }

    fn rejected(&self, operation: &str, error: ReputationError) -> ReputationError {
        debug!(operation, reason = error.kind(), "Operation rejected: {}", error);
        if let Some(m) = &self.metrics {
            metrics::record_rejection(m, operation, error.kind());
        }
        error
    }

    // === QUERIES ===

    /// Derived status; unknown identities are "In progress"
    pub fn guide_status(&self, identity: &Identity) -> GuideStatus {
        self.registry
            .get(identity)
            .map(|guide| guide.status(self.config.min_total_ratings))
            .unwrap_or(GuideStatus::InProgress)
    }

    pub fn feedback(&self, id: FeedbackId) -> Result<FeedbackView> {
        self.feedback.get(id).map(FeedbackView::from)
    }

    /// Number of feedback entries ever submitted
    pub fn feedback_count(&self) -> u64 {
        self.feedback.len()
    }

    pub fn ratings(&self, id: FeedbackId) -> Result<Vec<Rating>> {
        Ok(self.feedback.get(id)?.ratings.clone())
    }

    pub fn feedback_by_author(&self, author: &Identity) -> Vec<FeedbackEntry> {
        self.feedback.by_author(author).into_iter().cloned().collect()
    }

    pub fn guide_record(&self, identity: &Identity) -> Option<&Guide> {
        self.registry.get(identity)
    }

    pub fn guide(&self, identity: &Identity) -> Option<GuideSummary> {
        self.registry.get(identity).map(|guide| GuideSummary {
            identity: identity.clone(),
            feedback_count: guide.feedback_count,
            match_count: guide.match_count,
            is_verified: guide.is_verified,
            status: guide.status(self.config.min_total_ratings),
            totals: guide.totals,
            averages: FixedPointAverages::from_totals(&guide.totals),
            balance: self.rewards.balance_of(identity),
        })
    }

    /// Every guide, ordered by identity
    pub fn guides(&self) -> Vec<GuideSummary> {
        let mut identities: Vec<&Identity> = self.registry.iter().map(|(id, _)| id).collect();
        identities.sort();
        identities
            .into_iter()
            .filter_map(|identity| self.guide(identity))
            .collect()
    }

    pub fn is_verified(&self, identity: &Identity) -> bool {
        self.registry.is_verified(identity)
    }

    pub fn balance_of(&self, identity: &Identity) -> Amount {
        self.rewards.balance_of(identity)
    }

    pub fn rewards_for(&self, identity: &Identity) -> Vec<Reward> {
        self.rewards.rewards_for(identity)
    }

    pub fn statistics(&self) -> LedgerStatistics {
        let rewards = self.rewards.statistics();
        LedgerStatistics {
            total_guides: self.registry.len(),
            verified_guides: self.registry.verified_count(),
            feedback_entries: self.feedback.len(),
            total_ratings: self.feedback.total_ratings(),
            rewards_issued: rewards.rewards_count,
            reward_value: rewards.total_issued,
        }
    }
}

impl Default for ReputationLedger {
    fn default() -> Self {
        Self::new()
    }
}
