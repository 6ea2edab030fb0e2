//! Notifications emitted after successful mutations

use crate::types::{Amount, FeedbackId, Identity, Scores};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Notification payloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReputationEvent {
    GuideRegistered {
        identity: Identity,
    },

    /// Edge-triggered only
    GuideStatusChanged {
        identity: Identity,
        verified: bool,
    },

    FeedbackSubmitted {
        feedback_id: FeedbackId,
        author: Identity,
        content: String,
    },

    FeedbackRated {
        feedback_id: FeedbackId,
        author: Identity,
        rater: Identity,
        scores: Scores,
    },

    RewardIssued {
        identity: Identity,
        amount: Amount,
    },
}

impl ReputationEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ReputationEvent::GuideRegistered { .. } => "guide_registered",
            ReputationEvent::GuideStatusChanged { .. } => "guide_status_changed",
            ReputationEvent::FeedbackSubmitted { .. } => "feedback_submitted",
            ReputationEvent::FeedbackRated { .. } => "feedback_rated",
            ReputationEvent::RewardIssued { .. } => "reward_issued",
        }
    }
}

/// Receives notifications. Delivery happens only once an operation has
/// fully succeeded, in emission order.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: &ReputationEvent);
}

/// Discards every event
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&self, _event: &ReputationEvent) {}
}

/// Logs every event through `tracing` at debug level
///
/// The ledger already logs registrations, verification edges and rewards at
/// info, so the full payloads only show up with debug enabled.
#[derive(Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn publish(&self, event: &ReputationEvent) {
        match serde_json::to_string(event) {
            Ok(json) => debug!(event = event.name(), "{}", json),
            Err(_) => debug!(event = event.name(), "{:?}", event),
        }
    }
}

/// In-memory event collector
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<ReputationEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ReputationEvent> {
        self.events.lock().clone()
    }

    /// Take every buffered event, leaving the log empty
    pub fn drain(&self) -> Vec<ReputationEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventSink for EventLog {
    fn publish(&self, event: &ReputationEvent) {
        self.events.lock().push(event.clone());
    }
}
