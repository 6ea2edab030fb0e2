//! Error types for the reputation ledger

use crate::types::{FeedbackId, Identity, Scores};
use thiserror::Error;

/// Precondition violations. Every failure is detected before any mutation.
///
/// `InvalidConfig` is only returned while building a ledger.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReputationError {
    #[error("Guide already registered: {0}")]
    AlreadyRegistered(Identity),

    #[error("Verified guide cannot submit feedback: {0}")]
    VerifiedCannotSubmit(Identity),

    #[error("Invalid feedback id: {id} (feedback count: {count})")]
    InvalidFeedbackId { id: FeedbackId, count: u64 },

    #[error("Invalid score range: {0} (each score must be 1-5)")]
    InvalidScoreRange(Scores),

    #[error("Guide cannot rate own feedback: {0}")]
    SelfRatingForbidden(Identity),

    #[error("Feedback {feedback_id} already rated by {rater}")]
    DuplicateRating {
        feedback_id: FeedbackId,
        rater: Identity,
    },

    #[error("Unauthorized caller: {0}")]
    Unauthorized(Identity),

    #[error("Only verified guides can rate feedback: {0}")]
    VerifiedGuideOnly(Identity),

    #[error("Unknown guide: {0}")]
    UnknownGuide(Identity),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ReputationError {
    /// Stable label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            ReputationError::AlreadyRegistered(_) => "already_registered",
            ReputationError::VerifiedCannotSubmit(_) => "verified_cannot_submit",
            ReputationError::InvalidFeedbackId { .. } => "invalid_feedback_id",
            ReputationError::InvalidScoreRange(_) => "invalid_score_range",
            ReputationError::SelfRatingForbidden(_) => "self_rating_forbidden",
            ReputationError::DuplicateRating { .. } => "duplicate_rating",
            ReputationError::Unauthorized(_) => "unauthorized",
            ReputationError::VerifiedGuideOnly(_) => "verified_guide_only",
            ReputationError::UnknownGuide(_) => "unknown_guide",
            ReputationError::InvalidConfig(_) => "invalid_config",
        }
    }
}

pub type Result<T> = std::result::Result<T, ReputationError>;
