//! Append-only feedback log

use crate::error::{ReputationError, Result};
use crate::registry::GuideRegistry;
use crate::types::{FeedbackEntry, FeedbackId, Identity};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// How many of a guide's feedback entries have been rated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Coverage {
    pub entries: usize,
    pub unrated: usize,
}

impl Coverage {
    /// Every authored entry has at least one rating
    pub fn is_complete(&self) -> bool {
        self.unrated == 0
    }
}

/// Ordered feedback log. Ids are insertion indices and never reused.
#[derive(Debug, Clone, Default)]
pub struct FeedbackStore {
    entries: Vec<FeedbackEntry>,
    by_author: HashMap<Identity, Vec<FeedbackId>>,
}

impl FeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a feedback entry for `author` and bump its feedback counter
    pub fn submit(
        &mut self,
        registry: &mut GuideRegistry,
        author: &Identity,
        content: String,
        timestamp: DateTime<Utc>,
    ) -> Result<FeedbackId> {
        if registry.is_verified(author) {
            return Err(ReputationError::VerifiedCannotSubmit(author.clone()));
        }

        let id = self.entries.len() as FeedbackId;
        self.entries
            .push(FeedbackEntry::new(id, author.clone(), content, timestamp));
        self.by_author.entry(author.clone()).or_default().push(id);
        registry.record_feedback(author);

        Ok(id)
    }

    pub fn get(&self, id: FeedbackId) -> Result<&FeedbackEntry> {
        self.entries
            .get(Self::index(id)?)
            .ok_or(ReputationError::InvalidFeedbackId {
                id,
                count: self.len(),
            })
    }

    pub(crate) fn get_mut(&mut self, id: FeedbackId) -> Result<&mut FeedbackEntry> {
        let count = self.len();
        self.entries
            .get_mut(Self::index(id)?)
            .ok_or(ReputationError::InvalidFeedbackId { id, count })
    }

    fn index(id: FeedbackId) -> Result<usize> {
        usize::try_from(id).map_err(|_| ReputationError::InvalidFeedbackId { id, count: 0 })
    }

    /// Entries authored by `author`, in submission order
    pub fn by_author(&self, author: &Identity) -> Vec<&FeedbackEntry> {
        self.by_author
            .get(author)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.entries.get(*id as usize))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Rating coverage over every entry `author` wrote
    pub fn coverage(&self, author: &Identity) -> Coverage {
        self.by_author(author)
            .into_iter()
            .fold(Coverage::default(), |mut acc, entry| {
                acc.entries += 1;
                if !entry.is_rated() {
                    acc.unrated += 1;
                }
                acc
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeedbackEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> u64 {
        self.entries.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_ratings(&self) -> u64 {
        self.entries.iter().map(|e| e.ratings.len() as u64).sum()
    }
}
