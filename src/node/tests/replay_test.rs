//! Host tests: configuration files and script replay end to end

use guidenet_node::{load_script, replay, NodeConfig};
use guidenet_reputation::{GuideStatus, Identity, ReputationLedger};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn promotion_script(raters: usize) -> String {
    let mut lines = vec![
        r#"{"op":"register","identity":"alice"}"#.to_string(),
        r#"{"op":"submit_feedback","author":"alice","content":"ridge trail","timestamp":"2026-01-02T03:04:05Z"}"#.to_string(),
    ];
    for i in 0..raters {
        lines.push(format!(
            r#"{{"op":"rate_feedback","feedback_id":0,"rater":"r{}","expertise":5,"help":4,"recommend":4}}"#,
            i
        ));
    }
    lines.push(r#"{"op":"guide_status","identity":"alice"}"#.to_string());
    lines.join("\n")
}

#[test]
fn test_load_config_file() {
    let file = write_temp(
        r#"
[ledger]
admin = "ops"
founding_guides = ["r0", "r1"]

[policy]
min_total_ratings = 2
reward_amount = 500

[logging]
level = "debug"

[metrics]
enabled = false
"#,
    );

    let config = NodeConfig::load(file.path()).unwrap();
    config.validate().unwrap();

    let ledger = config.reputation_config();
    assert_eq!(ledger.admin, Identity::from("ops"));
    assert_eq!(ledger.min_total_ratings, 2);
    assert_eq!(ledger.reward_amount, 500);
    assert_eq!(ledger.founding_guides.len(), 2);
    assert!(!config.metrics.enabled);
}

#[test]
fn test_missing_config_file_is_an_error() {
    let err = NodeConfig::load("/definitely/not/here.toml").unwrap_err();
    assert!(err.to_string().contains("Failed to read configuration file"));
}

#[test]
fn test_malformed_config_is_an_error() {
    let file = write_temp("[policy]\nmin_total_ratings = \"ten\"\n");
    assert!(NodeConfig::load(file.path()).is_err());
}

#[test]
fn test_replay_promotes_guide() {
    let config_file = write_temp(
        r#"
[ledger]
founding_guides = ["r0", "r1", "r2", "r3", "r4", "r5", "r6", "r7", "r8", "r9"]
"#,
    );
    let config = NodeConfig::load(config_file.path()).unwrap();
    let script = write_temp(&promotion_script(10));

    let ops = load_script(script.path()).unwrap();
    let mut ledger = ReputationLedger::with_config(config.reputation_config()).unwrap();
    let report = replay(&mut ledger, &ops);

    assert_eq!(report.rejected, 0);
    assert_eq!(report.statistics.rewards_issued, 1);
    assert_eq!(ledger.guide_status(&Identity::from("alice")), GuideStatus::FormalGuide);
    assert_eq!(ledger.balance_of(&Identity::from("alice")), 100);

    let json = serde_json::to_value(&report).unwrap();
    let last = json["outcomes"].as_array().unwrap().last().unwrap().clone();
    assert_eq!(last["result"]["status"], "Formal Guide");

    let text = report.to_text();
    assert!(text.contains("Formal Guide"));
    assert!(text.contains("reward=100"));
}

#[test]
fn test_replay_reports_rejections_without_stopping() {
    let script = write_temp(&promotion_script(3));
    let ops = load_script(script.path()).unwrap();

    // No founding guides, so every rating is rejected
    let mut ledger = ReputationLedger::new();
    let report = replay(&mut ledger, &ops);

    assert_eq!(report.rejected, 3);
    assert_eq!(report.applied, 3);
    assert!(report.outcomes[2]
        .error
        .as_ref()
        .unwrap()
        .contains("Only verified guides can rate"));
    assert_eq!(ledger.guide_status(&Identity::from("alice")), GuideStatus::InProgress);
}
