//! Operation script replay
//!
//! The host side of the ledger: operations are read from a JSON Lines script
//! and applied strictly one at a time. A rejected operation is reported and
//! the replay moves on; a malformed line aborts the whole replay.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use guidenet_reputation::{
    FeedbackId, FeedbackView, GuideStatus, GuideSummary, Identity, LedgerStatistics,
    RatingOutcome, ReputationLedger, Scores,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// One line of a replay script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    Register {
        identity: Identity,
    },
    AppointFoundingGuide {
        caller: Identity,
        identity: Identity,
    },
    SubmitFeedback {
        author: Identity,
        content: String,
        /// Host clock when absent
        #[serde(default)]
        timestamp: Option<DateTime<Utc>>,
    },
    RateFeedback {
        feedback_id: FeedbackId,
        rater: Identity,
        expertise: u8,
        help: u8,
        recommend: u8,
    },
    SetMatchCount {
        caller: Identity,
        identity: Identity,
        count: u64,
    },
    GuideStatus {
        identity: Identity,
    },
    Feedback {
        feedback_id: FeedbackId,
    },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Register { .. } => "register",
            Operation::AppointFoundingGuide { .. } => "appoint_founding_guide",
            Operation::SubmitFeedback { .. } => "submit_feedback",
            Operation::RateFeedback { .. } => "rate_feedback",
            Operation::SetMatchCount { .. } => "set_match_count",
            Operation::GuideStatus { .. } => "guide_status",
            Operation::Feedback { .. } => "feedback",
        }
    }
}

/// What a successful operation produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum OperationResult {
    Done,
    FeedbackSubmitted { feedback_id: FeedbackId },
    Rated(RatingOutcome),
    Status { identity: Identity, status: GuideStatus },
    Feedback(FeedbackView),
}

/// Per-line outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationOutcome {
    pub line: usize,
    pub op: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<OperationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OperationOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Summary printed at the end of a replay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayReport {
    pub applied: usize,
    pub rejected: usize,
    pub outcomes: Vec<OperationOutcome>,
    pub statistics: LedgerStatistics,
    pub guides: Vec<GuideSummary>,
}

/// Parse a JSON Lines script into `(line number, operation)` pairs
///
/// Blank lines and `#` comments are skipped.
pub fn parse_script(script: &str) -> Result<Vec<(usize, Operation)>> {
    script
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(line_no, line)| {
            serde_json::from_str(line)
                .map(|op| (line_no, op))
                .with_context(|| format!("Invalid operation on line {}", line_no))
        })
        .collect()
}

/// Read and parse a script file
pub fn load_script<P: AsRef<Path>>(path: P) -> Result<Vec<(usize, Operation)>> {
    let contents = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read script {:?}", path.as_ref()))?;
    parse_script(&contents)
}

/// Apply a single operation to the ledger
pub fn apply(ledger: &mut ReputationLedger, op: &Operation) -> guidenet_reputation::Result<OperationResult> {
    match op {
        Operation::Register { identity } => {
            ledger.register(identity)?;
            Ok(OperationResult::Done)
        }
        Operation::AppointFoundingGuide { caller, identity } => {
            ledger.appoint_founding_guide(caller, identity)?;
            Ok(OperationResult::Done)
        }
        Operation::SubmitFeedback {
            author,
            content,
            timestamp,
        } => {
            let feedback_id =
                ledger.submit_feedback(author, content.clone(), timestamp.unwrap_or_else(Utc::now))?;
            Ok(OperationResult::FeedbackSubmitted { feedback_id })
        }
        Operation::RateFeedback {
            feedback_id,
            rater,
            expertise,
            help,
            recommend,
        } => {
            let outcome =
                ledger.rate_feedback(*feedback_id, rater, Scores::new(*expertise, *help, *recommend))?;
            Ok(OperationResult::Rated(outcome))
        }
        Operation::SetMatchCount {
            caller,
            identity,
            count,
        } => {
            ledger.set_match_count(caller, identity, *count)?;
            Ok(OperationResult::Done)
        }
        Operation::GuideStatus { identity } => Ok(OperationResult::Status {
            identity: identity.clone(),
            status: ledger.guide_status(identity),
        }),
        Operation::Feedback { feedback_id } => {
            Ok(OperationResult::Feedback(ledger.feedback(*feedback_id)?))
        }
    }
}

/// Apply every operation in order and build the report
pub fn replay(ledger: &mut ReputationLedger, ops: &[(usize, Operation)]) -> ReplayReport {
    let mut outcomes = Vec::with_capacity(ops.len());

    for (line, op) in ops {
        let outcome = match apply(ledger, op) {
            Ok(result) => {
                debug!(line, op = op.name(), "Operation applied");
                OperationOutcome {
                    line: *line,
                    op: op.name().to_string(),
                    result: Some(result),
                    error: None,
                }
            }
            Err(e) => {
                warn!(line, op = op.name(), reason = e.kind(), "Operation rejected: {}", e);
                OperationOutcome {
                    line: *line,
                    op: op.name().to_string(),
                    result: None,
                    error: Some(e.to_string()),
                }
            }
        };
        outcomes.push(outcome);
    }

    let rejected = outcomes.iter().filter(|o| !o.is_ok()).count();
    ReplayReport {
        applied: outcomes.len() - rejected,
        rejected,
        outcomes,
        statistics: ledger.statistics(),
        guides: ledger.guides(),
    }
}

impl ReplayReport {
    /// Human-readable rendering
    pub fn to_text(&self) -> String {
        let mut out = String::new();

        for outcome in &self.outcomes {
            let detail = match (&outcome.result, &outcome.error) {
                (_, Some(error)) => format!("REJECTED {}", error),
                (Some(OperationResult::FeedbackSubmitted { feedback_id }), _) => {
                    format!("ok feedback #{}", feedback_id)
                }
                (Some(OperationResult::Rated(rated)), _) => format!(
                    "ok author={} verified={}{}",
                    rated.author,
                    rated.verified,
                    rated
                        .reward
                        .as_ref()
                        .map(|r| format!(" reward={}", r.amount))
                        .unwrap_or_default()
                ),
                (Some(OperationResult::Status { identity, status }), _) => {
                    format!("{}: {}", identity, status)
                }
                (Some(OperationResult::Feedback(view)), _) => format!(
                    "author={} ratings={} content={:?}",
                    view.author, view.rating_count, view.content
                ),
                _ => "ok".to_string(),
            };
            out.push_str(&format!("{:>4} {:<24} {}\n", outcome.line, outcome.op, detail));
        }

        out.push_str(&format!(
            "\napplied={} rejected={} guides={} verified={} feedback={} ratings={} rewards={} ({} total)\n",
            self.applied,
            self.rejected,
            self.statistics.total_guides,
            self.statistics.verified_guides,
            self.statistics.feedback_entries,
            self.statistics.total_ratings,
            self.statistics.rewards_issued,
            self.statistics.reward_value,
        ));

        for guide in &self.guides {
            out.push_str(&format!(
                "  {:<16} {:<12} ratings={:<4} overall={:<5} balance={}\n",
                guide.identity.as_str(),
                guide.status.as_str(),
                guide.totals.ratings,
                guide
                    .averages
                    .map(|a| a.overall.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                guide.balance,
            ));
        }

        out
    }
}
