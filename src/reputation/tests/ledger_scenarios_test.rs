//! End-to-end scenarios for registration, feedback, rating and verification

use chrono::Utc;
use guidenet_reputation::{
    EventLog, GuideStatus, Identity, ReputationConfig, ReputationError, ReputationEvent,
    ReputationLedger, Scores,
};
use std::sync::Arc;

fn id(name: &str) -> Identity {
    Identity::from(name)
}

/// Ledger with `raters` founding guides named r0, r1, ...
fn ledger_with_raters(raters: usize) -> (ReputationLedger, Vec<Identity>, Arc<EventLog>) {
    let founders: Vec<Identity> = (0..raters).map(|i| Identity::new(format!("r{}", i))).collect();
    let config = ReputationConfig {
        founding_guides: founders.clone(),
        ..Default::default()
    };
    let log = Arc::new(EventLog::new());
    let ledger = ReputationLedger::with_config(config).unwrap().with_sink(log.clone());
    (ledger, founders, log)
}

#[test]
fn test_scenario_a_unrated_feedback_stays_in_progress() {
    let (mut ledger, _, _) = ledger_with_raters(0);
    let guide = id("alice");

    ledger.register(&guide).unwrap();
    for i in 0..10 {
        ledger
            .submit_feedback(&guide, format!("feedback {}", i), Utc::now())
            .unwrap();
    }

    let summary = ledger.guide(&guide).unwrap();
    assert_eq!(summary.feedback_count, 10);
    assert_eq!(summary.totals.ratings, 0);
    assert_eq!(summary.averages, None);
    assert_eq!(ledger.guide_status(&guide), GuideStatus::InProgress);
    assert_eq!(ledger.guide_status(&guide).to_string(), "In progress");
}

#[test]
fn test_scenario_b_unrated_entry_blocks_verification() {
    let (mut ledger, raters, _) = ledger_with_raters(5);
    let guide = id("alice");

    let first = ledger.submit_feedback(&guide, "first", Utc::now()).unwrap();
    let second = ledger.submit_feedback(&guide, "second", Utc::now()).unwrap();
    let _unrated = ledger.submit_feedback(&guide, "third", Utc::now()).unwrap();

    for rater in &raters {
        ledger.rate_feedback(first, rater, Scores::new(5, 5, 5)).unwrap();
        ledger.rate_feedback(second, rater, Scores::new(5, 5, 5)).unwrap();
    }

    let summary = ledger.guide(&guide).unwrap();
    assert_eq!(summary.totals.ratings, 10);
    assert_eq!(summary.averages.map(|a| a.overall), Some(5000));
    assert!(!summary.is_verified);
    assert_eq!(summary.status, GuideStatus::Almost);
    assert_eq!(ledger.balance_of(&guide), 0);
}

#[test]
fn test_scenario_c_inclusive_thresholds_verify() {
    let (mut ledger, raters, log) = ledger_with_raters(5);
    let guide = id("alice");

    let first = ledger.submit_feedback(&guide, "first", Utc::now()).unwrap();
    let second = ledger.submit_feedback(&guide, "second", Utc::now()).unwrap();

    // expertise 3.000, help 4.000, recommend 5.000 -> overall exactly 4.000
    let mut last = None;
    for rater in &raters {
        ledger.rate_feedback(first, rater, Scores::new(3, 4, 5)).unwrap();
        last = Some(ledger.rate_feedback(second, rater, Scores::new(3, 4, 5)).unwrap());
    }

    let outcome = last.unwrap();
    assert!(outcome.verified);
    assert!(outcome.status_changed);
    assert!(outcome.reward.is_some());

    let averages = ledger.guide(&guide).unwrap().averages.unwrap();
    assert_eq!(averages.expertise, 3000);
    assert_eq!(averages.overall, 4000);
    assert_eq!(ledger.guide_status(&guide), GuideStatus::FormalGuide);
    assert_eq!(ledger.balance_of(&guide), ledger.config().reward_amount);

    let edges: Vec<_> = log
        .events()
        .into_iter()
        .filter(|e| matches!(e, ReputationEvent::GuideStatusChanged { .. }))
        .collect();
    assert_eq!(
        edges,
        vec![ReputationEvent::GuideStatusChanged {
            identity: guide.clone(),
            verified: true
        }]
    );
}

#[test]
fn test_scenario_d_verified_guide_cannot_submit() {
    let (mut ledger, raters, log) = ledger_with_raters(10);
    let guide = id("alice");

    let fid = ledger.submit_feedback(&guide, "tip", Utc::now()).unwrap();
    for rater in &raters {
        ledger.rate_feedback(fid, rater, Scores::new(5, 5, 5)).unwrap();
    }
    assert!(ledger.is_verified(&guide));
    log.drain();

    let result = ledger.submit_feedback(&guide, "more", Utc::now());

    assert_eq!(result, Err(ReputationError::VerifiedCannotSubmit(guide.clone())));
    assert_eq!(ledger.feedback_count(), 1);
    assert_eq!(ledger.guide(&guide).unwrap().feedback_count, 1);
    assert!(log.is_empty());
}

#[test]
fn test_scenario_e_duplicate_rating_leaves_totals_unchanged() {
    let (mut ledger, raters, log) = ledger_with_raters(1);
    let guide = id("alice");
    let fid = ledger.submit_feedback(&guide, "tip", Utc::now()).unwrap();

    ledger.rate_feedback(fid, &raters[0], Scores::new(4, 4, 4)).unwrap();
    let before = ledger.guide(&guide).unwrap();
    log.drain();

    let result = ledger.rate_feedback(fid, &raters[0], Scores::new(1, 1, 1));

    assert_eq!(
        result.unwrap_err(),
        ReputationError::DuplicateRating {
            feedback_id: fid,
            rater: raters[0].clone()
        }
    );
    assert_eq!(ledger.guide(&guide).unwrap(), before);
    assert_eq!(ledger.feedback(fid).unwrap().rating_count, 1);
    assert!(log.is_empty());
}

#[test]
fn test_flapping_guide_is_rewarded_on_every_promotion() {
    let (mut ledger, raters, log) = ledger_with_raters(16);
    let guide = id("alice");
    let fid = ledger.submit_feedback(&guide, "tip", Utc::now()).unwrap();

    // 10 x 5/5/5 -> promoted
    for rater in &raters[..10] {
        ledger.rate_feedback(fid, rater, Scores::new(5, 5, 5)).unwrap();
    }
    assert!(ledger.is_verified(&guide));

    // 4 x 1/1/1 -> overall 54000 / 14 = 3857 -> demoted
    for rater in &raters[10..14] {
        ledger.rate_feedback(fid, rater, Scores::new(1, 1, 1)).unwrap();
    }
    assert!(!ledger.is_verified(&guide));
    assert_eq!(ledger.guide_status(&guide), GuideStatus::Almost);

    // 2 x 5/5/5 -> overall 64000 / 16 = 4000 -> promoted again
    for rater in &raters[14..16] {
        ledger.rate_feedback(fid, rater, Scores::new(5, 5, 5)).unwrap();
    }
    assert!(ledger.is_verified(&guide));

    let rewards = ledger.rewards_for(&guide);
    assert_eq!(rewards.len(), 2);
    assert_eq!(ledger.balance_of(&guide), 2 * ledger.config().reward_amount);

    let edges: Vec<bool> = log
        .events()
        .into_iter()
        .filter_map(|e| match e {
            ReputationEvent::GuideStatusChanged { verified, .. } => Some(verified),
            _ => None,
        })
        .collect();
    assert_eq!(edges, vec![true, false, true]);
}

#[test]
fn test_demoted_guide_may_submit_again_and_coverage_applies() {
    let (mut ledger, raters, _) = ledger_with_raters(16);
    let guide = id("alice");
    let fid = ledger.submit_feedback(&guide, "tip", Utc::now()).unwrap();

    for rater in &raters[..10] {
        ledger.rate_feedback(fid, rater, Scores::new(5, 5, 5)).unwrap();
    }
    for rater in &raters[10..14] {
        ledger.rate_feedback(fid, rater, Scores::new(1, 1, 1)).unwrap();
    }
    assert!(!ledger.is_verified(&guide));

    // Unverified again, so a new (unrated) entry is accepted
    let fresh = ledger.submit_feedback(&guide, "fresh", Utc::now()).unwrap();

    // Averages would pass after these, but `fresh` has no ratings yet
    for rater in &raters[14..16] {
        ledger.rate_feedback(fid, rater, Scores::new(5, 5, 5)).unwrap();
    }
    assert!(!ledger.is_verified(&guide));

    ledger.rate_feedback(fresh, &raters[0], Scores::new(5, 5, 5)).unwrap();
    assert!(ledger.is_verified(&guide));
    assert_eq!(ledger.rewards_for(&guide).len(), 2);
}

#[test]
fn test_registration_rules() {
    let (mut ledger, raters, _) = ledger_with_raters(1);
    let guide = id("alice");

    ledger.register(&guide).unwrap();
    // No activity yet, registering again just resets the record
    ledger.register(&guide).unwrap();

    ledger.submit_feedback(&guide, "tip", Utc::now()).unwrap();
    assert_eq!(
        ledger.register(&guide),
        Err(ReputationError::AlreadyRegistered(guide.clone()))
    );
    assert_eq!(
        ledger.register(&raters[0]),
        Err(ReputationError::AlreadyRegistered(raters[0].clone()))
    );
}

#[test]
fn test_rating_preconditions() {
    let (mut ledger, raters, _) = ledger_with_raters(1);
    let guide = id("alice");
    let fid = ledger.submit_feedback(&guide, "tip", Utc::now()).unwrap();

    assert_eq!(
        ledger.rate_feedback(fid, &id("bob"), Scores::new(5, 5, 5)),
        Err(ReputationError::VerifiedGuideOnly(id("bob")))
    );
    assert_eq!(
        ledger.rate_feedback(7, &raters[0], Scores::new(5, 5, 5)),
        Err(ReputationError::InvalidFeedbackId { id: 7, count: 1 })
    );
    assert_eq!(
        ledger.rate_feedback(fid, &raters[0], Scores::new(5, 0, 5)),
        Err(ReputationError::InvalidScoreRange(Scores::new(5, 0, 5)))
    );
    assert_eq!(ledger.feedback(fid).unwrap().rating_count, 0);
    assert_eq!(ledger.guide(&guide).unwrap().totals.ratings, 0);
}

#[test]
fn test_admin_operations() {
    let (mut ledger, _, _) = ledger_with_raters(0);
    let guide = id("alice");
    ledger.register(&guide).unwrap();

    assert_eq!(
        ledger.set_match_count(&guide, &guide, 5),
        Err(ReputationError::Unauthorized(guide.clone()))
    );

    ledger.set_match_count(&id("admin"), &guide, 5).unwrap();
    ledger.set_match_count(&id("admin"), &guide, 2).unwrap();
    let summary = ledger.guide(&guide).unwrap();
    assert_eq!(summary.match_count, 2);
    assert_eq!(summary.status, GuideStatus::InProgress);
}
