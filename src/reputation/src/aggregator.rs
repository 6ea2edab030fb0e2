//! Rating aggregation
//!
//! Validates a rating against its feedback entry and folds it into the
//! author's running totals. All checks run before anything is mutated.

use crate::error::{ReputationError, Result};
use crate::feedback_store::FeedbackStore;
use crate::registry::GuideRegistry;
use crate::types::{FeedbackId, Identity, Rating, RatingTotals, Scores};

/// Outcome of a recorded rating
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRating {
    pub feedback_id: FeedbackId,
    pub author: Identity,
    pub rater: Identity,
    pub scores: Scores,

    /// Author totals after this rating was applied
    pub author_totals: RatingTotals,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RatingAggregator;

impl RatingAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Run every precondition for `rater` rating `feedback_id`
    ///
    /// Returns the author of the entry on success.
    pub fn check(
        &self,
        registry: &GuideRegistry,
        store: &FeedbackStore,
        feedback_id: FeedbackId,
        rater: &Identity,
        scores: &Scores,
    ) -> Result<Identity> {
        if !registry.is_verified(rater) {
            return Err(ReputationError::VerifiedGuideOnly(rater.clone()));
        }

        let entry = store.get(feedback_id)?;

        if !scores.in_range() {
            return Err(ReputationError::InvalidScoreRange(*scores));
        }

        if &entry.author == rater {
            return Err(ReputationError::SelfRatingForbidden(rater.clone()));
        }

        if entry.raters.contains(rater) {
            return Err(ReputationError::DuplicateRating {
                feedback_id,
                rater: rater.clone(),
            });
        }

        Ok(entry.author.clone())
    }

    /// Validate, then append the rating and update the author's totals
    pub fn rate(
        &self,
        registry: &mut GuideRegistry,
        store: &mut FeedbackStore,
        feedback_id: FeedbackId,
        rater: &Identity,
        scores: Scores,
    ) -> Result<RecordedRating> {
        let author = self.check(registry, store, feedback_id, rater, &scores)?;

        let entry = store.get_mut(feedback_id)?;
        entry.raters.insert(rater.clone());
        entry.ratings.push(Rating {
            rater: rater.clone(),
            scores,
        });

        let author_totals = registry.record_rating(&author, &scores).totals;

        Ok(RecordedRating {
            feedback_id,
            author,
            rater: rater.clone(),
            scores,
            author_totals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    struct Fixture {
        registry: GuideRegistry,
        store: FeedbackStore,
        author: Identity,
        rater: Identity,
        feedback_id: FeedbackId,
    }

    fn fixture() -> Fixture {
        let mut registry = GuideRegistry::new();
        let mut store = FeedbackStore::new();
        let author = Identity::from("author");
        let rater = Identity::from("rater");

        registry.register(&author).unwrap();
        registry.insert_verified(&rater).unwrap();
        let feedback_id = store
            .submit(&mut registry, &author, "useful tip".to_string(), Utc::now())
            .unwrap();

        Fixture {
            registry,
            store,
            author,
            rater,
            feedback_id,
        }
    }

    #[test]
    fn test_rate_updates_entry_and_totals() {
        let mut f = fixture();
        let aggregator = RatingAggregator::new();

        let recorded = aggregator
            .rate(&mut f.registry, &mut f.store, f.feedback_id, &f.rater, Scores::new(4, 5, 3))
            .unwrap();

        assert_eq!(recorded.author, f.author);
        assert_eq!(
            recorded.author_totals,
            RatingTotals {
                expertise: 4,
                help: 5,
                recommend: 3,
                ratings: 1
            }
        );
        assert_eq!(f.store.get(f.feedback_id).unwrap().rating_count(), 1);
    }

    #[test]
    fn test_unverified_rater_rejected() {
        let mut f = fixture();
        let stranger = Identity::from("stranger");

        let result = RatingAggregator::new().rate(
            &mut f.registry,
            &mut f.store,
            f.feedback_id,
            &stranger,
            Scores::new(5, 5, 5),
        );
        assert_eq!(result, Err(ReputationError::VerifiedGuideOnly(stranger)));
    }

    #[test]
    fn test_out_of_range_rejected_without_change() {
        let mut f = fixture();

        for scores in [Scores::new(0, 3, 3), Scores::new(3, 6, 3), Scores::new(3, 3, 9)] {
            let result = RatingAggregator::new().rate(
                &mut f.registry,
                &mut f.store,
                f.feedback_id,
                &f.rater,
                scores,
            );
            assert_eq!(result, Err(ReputationError::InvalidScoreRange(scores)));
        }

        assert_eq!(f.store.get(f.feedback_id).unwrap().rating_count(), 0);
        assert_eq!(f.registry.get(&f.author).unwrap().totals, RatingTotals::default());
    }

    #[test]
    fn test_missing_feedback_rejected() {
        let mut f = fixture();

        let result = RatingAggregator::new().rate(
            &mut f.registry,
            &mut f.store,
            42,
            &f.rater,
            Scores::new(3, 3, 3),
        );
        assert_eq!(
            result,
            Err(ReputationError::InvalidFeedbackId { id: 42, count: 1 })
        );
    }

    #[test]
    fn test_self_rating_rejected() {
        let mut f = fixture();
        // Author becomes verified after submitting
        f.registry.set_verified(&f.author, true);

        let result = RatingAggregator::new().rate(
            &mut f.registry,
            &mut f.store,
            f.feedback_id,
            &f.author.clone(),
            Scores::new(5, 5, 5),
        );
        assert_eq!(result, Err(ReputationError::SelfRatingForbidden(f.author.clone())));
    }

    #[test]
    fn test_duplicate_rating_rejected() {
        let mut f = fixture();
        let aggregator = RatingAggregator::new();

        aggregator
            .rate(&mut f.registry, &mut f.store, f.feedback_id, &f.rater, Scores::new(5, 5, 5))
            .unwrap();
        let result = aggregator.rate(
            &mut f.registry,
            &mut f.store,
            f.feedback_id,
            &f.rater,
            Scores::new(1, 1, 1),
        );

        assert!(matches!(result, Err(ReputationError::DuplicateRating { .. })));
        assert_eq!(f.registry.get(&f.author).unwrap().totals.ratings, 1);
        assert_eq!(f.registry.get(&f.author).unwrap().totals.expertise, 5);
    }
}
