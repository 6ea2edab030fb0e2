//! Reward issuance for guides entering the verified state
//!
//! One credit of the configured amount per rising verification edge. Repeated
//! edges for the same guide are each rewarded.

use crate::types::{Amount, Identity, Reward, FIXED_REWARD};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Statistics about issued rewards
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardStatistics {
    /// Total value credited
    pub total_issued: Amount,

    /// Number of reward records
    pub rewards_count: usize,

    /// Number of distinct guides ever credited
    pub unique_recipients: usize,
}

/// Credits guide balances and keeps the reward history
#[derive(Debug, Clone)]
pub struct RewardIssuer {
    /// Credit per rising edge
    amount: Amount,

    /// Current balance per guide
    balances: HashMap<Identity, Amount>,

    /// Every issued reward, in issue order
    history: Vec<Reward>,
}

impl Default for RewardIssuer {
    fn default() -> Self {
        Self::new(FIXED_REWARD)
    }
}

impl RewardIssuer {
    pub fn new(amount: Amount) -> Self {
        Self {
            amount,
            balances: HashMap::new(),
            history: Vec::new(),
        }
    }

    /// Fixed amount credited per rising edge
    pub fn amount(&self) -> Amount {
        self.amount
    }

    /// Credit the fixed amount to `identity`
    pub fn issue(&mut self, identity: &Identity) -> Reward {
        self.credit(identity, self.amount)
    }

    /// Credit `amount` to `identity` and record the reward
    pub fn credit(&mut self, identity: &Identity, amount: Amount) -> Reward {
        let balance = self.balances.entry(identity.clone()).or_insert(0);
        *balance = balance.saturating_add(amount);

        let reward = Reward {
            id: Uuid::new_v4(),
            guide: identity.clone(),
            amount,
            issued_at: Utc::now(),
        };
        self.history.push(reward.clone());
        reward
    }

    pub fn balance_of(&self, identity: &Identity) -> Amount {
        self.balances.get(identity).copied().unwrap_or(0)
    }

    /// Rewards issued to `identity`, oldest first
    pub fn rewards_for(&self, identity: &Identity) -> Vec<Reward> {
        self.history
            .iter()
            .filter(|reward| &reward.guide == identity)
            .cloned()
            .collect()
    }

    pub fn history(&self) -> &[Reward] {
        &self.history
    }

    pub fn statistics(&self) -> RewardStatistics {
        RewardStatistics {
            total_issued: self
                .history
                .iter()
                .fold(0, |total, r| total.saturating_add(r.amount)),
            rewards_count: self.history.len(),
            unique_recipients: self.balances.len(),
        }
    }
}
