//! Thread-safe ledger handle
//!
//! A single coarse lock around [`ReputationLedger`]: mutations take the write
//! lock so they stay totally ordered, queries share the read lock.

use crate::error::Result;
use crate::ledger::{GuideSummary, LedgerStatistics, RatingOutcome, ReputationLedger};
use crate::types::{Amount, FeedbackId, FeedbackView, GuideStatus, Identity, Scores};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Clone)]
pub struct SharedLedger {
    inner: Arc<RwLock<ReputationLedger>>,
}

impl SharedLedger {
    pub fn new(ledger: ReputationLedger) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ledger)),
        }
    }

    pub fn register(&self, identity: &Identity) -> Result<()> {
        self.inner.write().register(identity)
    }

    pub fn appoint_founding_guide(&self, caller: &Identity, identity: &Identity) -> Result<()> {
        self.inner.write().appoint_founding_guide(caller, identity)
    }

    pub fn submit_feedback(
        &self,
        author: &Identity,
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Result<FeedbackId> {
        self.inner.write().submit_feedback(author, content, timestamp)
    }

    pub fn rate_feedback(&self, feedback_id: FeedbackId, rater: &Identity, scores: Scores) -> Result<RatingOutcome> {
        self.inner.write().rate_feedback(feedback_id, rater, scores)
    }

    pub fn set_match_count(&self, caller: &Identity, identity: &Identity, count: u64) -> Result<()> {
        self.inner.write().set_match_count(caller, identity, count)
    }

    pub fn guide_status(&self, identity: &Identity) -> GuideStatus {
        self.inner.read().guide_status(identity)
    }

    pub fn feedback(&self, id: FeedbackId) -> Result<FeedbackView> {
        self.inner.read().feedback(id)
    }

    pub fn feedback_count(&self) -> u64 {
        self.inner.read().feedback_count()
    }

    pub fn guide(&self, identity: &Identity) -> Option<GuideSummary> {
        self.inner.read().guide(identity)
    }

    pub fn balance_of(&self, identity: &Identity) -> Amount {
        self.inner.read().balance_of(identity)
    }

    pub fn statistics(&self) -> LedgerStatistics {
        self.inner.read().statistics()
    }

    /// Run `f` with read access to the whole ledger
    pub fn read<R>(&self, f: impl FnOnce(&ReputationLedger) -> R) -> R {
        f(&self.inner.read())
    }
}

impl From<ReputationLedger> for SharedLedger {
    fn from(ledger: ReputationLedger) -> Self {
        Self::new(ledger)
    }
}
