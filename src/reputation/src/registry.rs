//! Guide registry: one record per identity

use crate::error::{ReputationError, Result};
use crate::types::{Guide, Identity, Scores};
use std::collections::HashMap;

/// Owns every guide record. Records are never deleted.
#[derive(Debug, Clone, Default)]
pub struct GuideRegistry {
    guides: HashMap<Identity, Guide>,
}

impl GuideRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a zeroed record for `identity`
    ///
    /// An existing record is only replaced while it is unverified and has no
    /// authored feedback.
    pub fn register(&mut self, identity: &Identity) -> Result<()> {
        if let Some(existing) = self.guides.get(identity) {
            if existing.is_verified || existing.feedback_count > 0 {
                return Err(ReputationError::AlreadyRegistered(identity.clone()));
            }
        }

        self.guides.insert(identity.clone(), Guide::default());
        Ok(())
    }

    /// Create a record that starts verified. Fails if any record exists.
    pub fn insert_verified(&mut self, identity: &Identity) -> Result<()> {
        if self.guides.contains_key(identity) {
            return Err(ReputationError::AlreadyRegistered(identity.clone()));
        }

        self.guides.insert(
            identity.clone(),
            Guide {
                is_verified: true,
                ..Guide::default()
            },
        );
        Ok(())
    }

    pub fn get(&self, identity: &Identity) -> Option<&Guide> {
        self.guides.get(identity)
    }

    pub fn contains(&self, identity: &Identity) -> bool {
        self.guides.contains_key(identity)
    }

    /// Unknown identities are unverified
    pub fn is_verified(&self, identity: &Identity) -> bool {
        self.guides
            .get(identity)
            .map(|guide| guide.is_verified)
            .unwrap_or(false)
    }

    /// Bump the authored-feedback counter, creating the record if needed
    pub(crate) fn record_feedback(&mut self, author: &Identity) {
        self.guides.entry(author.clone()).or_default().feedback_count += 1;
    }

    /// Add one rating to the author's running totals
    pub(crate) fn record_rating(&mut self, author: &Identity, scores: &Scores) -> &Guide {
        let guide = self.guides.entry(author.clone()).or_default();
        guide.totals.add(scores);
        guide
    }

    /// Replace the verification flag, returning the previous value
    pub(crate) fn set_verified(&mut self, identity: &Identity, verified: bool) -> bool {
        let guide = self.guides.entry(identity.clone()).or_default();
        std::mem::replace(&mut guide.is_verified, verified)
    }

    pub(crate) fn set_match_count(&mut self, identity: &Identity, count: u64) -> Result<()> {
        let guide = self
            .guides
            .get_mut(identity)
            .ok_or_else(|| ReputationError::UnknownGuide(identity.clone()))?;
        guide.match_count = count;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Identity, &Guide)> {
        self.guides.iter()
    }

    pub fn len(&self) -> usize {
        self.guides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guides.is_empty()
    }

    pub fn verified_count(&self) -> usize {
        self.guides.values().filter(|guide| guide.is_verified).count()
    }
}
