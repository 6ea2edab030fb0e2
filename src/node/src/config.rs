//! Host configuration loading and validation

use anyhow::{Context, Result};
use guidenet_reputation::{
    Amount, Identity, ReputationConfig, FIXED_REWARD, MIN_METRIC_AVERAGE, MIN_OVERALL_AVERAGE,
    MIN_TOTAL_RATINGS,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete host configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NodeConfig {
    #[serde(default)]
    pub ledger: LedgerSection,

    #[serde(default)]
    pub policy: PolicySection,

    #[serde(default)]
    pub logging: LoggingSection,

    #[serde(default)]
    pub metrics: MetricsSection,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LedgerSection {
    #[serde(default = "default_admin")]
    pub admin: String,
    #[serde(default)]
    pub founding_guides: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PolicySection {
    #[serde(default = "default_min_total_ratings")]
    pub min_total_ratings: u64,
    #[serde(default = "default_min_metric_average")]
    pub min_metric_average: u64,
    #[serde(default = "default_min_overall_average")]
    pub min_overall_average: u64,
    #[serde(default = "default_reward_amount")]
    pub reward_amount: Amount,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSection {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log every notification through the tracing sink
    #[serde(default = "default_true")]
    pub log_events: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsSection {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub print_on_exit: bool,
}

impl Default for LedgerSection {
    fn default() -> Self {
        Self {
            admin: default_admin(),
            founding_guides: Vec::new(),
        }
    }
}

impl Default for PolicySection {
    fn default() -> Self {
        Self {
            min_total_ratings: default_min_total_ratings(),
            min_metric_average: default_min_metric_average(),
            min_overall_average: default_min_overall_average(),
            reward_amount: default_reward_amount(),
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_events: true,
        }
    }
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            enabled: true,
            print_on_exit: false,
        }
    }
}

// Default value functions
fn default_true() -> bool { true }
fn default_admin() -> String { "admin".to_string() }
fn default_min_total_ratings() -> u64 { MIN_TOTAL_RATINGS }
fn default_min_metric_average() -> u64 { MIN_METRIC_AVERAGE }
fn default_min_overall_average() -> u64 { MIN_OVERALL_AVERAGE }
fn default_reward_amount() -> Amount { FIXED_REWARD }
fn default_log_level() -> String { "info".to_string() }

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl NodeConfig {
    /// Load configuration from TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read configuration file {:?}", path.as_ref()))?;

        let config: NodeConfig = toml::from_str(&contents)
            .context("Failed to parse configuration file")?;

        Ok(config)
    }

    /// Load from `path` when given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            anyhow::bail!("logging.level must be one of {:?}", LOG_LEVELS);
        }

        self.reputation_config()
            .validate()
            .context("Invalid [ledger] or [policy] section")?;

        Ok(())
    }

    /// Ledger configuration derived from the [ledger] and [policy] sections
    pub fn reputation_config(&self) -> ReputationConfig {
        ReputationConfig {
            admin: Identity::new(self.ledger.admin.clone()),
            min_total_ratings: self.policy.min_total_ratings,
            min_metric_average: self.policy.min_metric_average,
            min_overall_average: self.policy.min_overall_average,
            reward_amount: self.policy.reward_amount,
            founding_guides: self
                .ledger
                .founding_guides
                .iter()
                .map(|g| Identity::new(g.clone()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = NodeConfig::default();
        config.validate().unwrap();

        let ledger = config.reputation_config();
        assert_eq!(ledger.min_total_ratings, 10);
        assert_eq!(ledger.reward_amount, FIXED_REWARD);
        assert_eq!(ledger.admin, Identity::from("admin"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: NodeConfig = toml::from_str(
            r#"
            [ledger]
            founding_guides = ["ana", "ben"]

            [policy]
            reward_amount = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.ledger.admin, "admin");
        assert_eq!(config.policy.reward_amount, 250);
        assert_eq!(config.policy.min_overall_average, 4000);
        assert_eq!(config.reputation_config().founding_guides.len(), 2);
        assert!(config.metrics.enabled);
    }

    #[test]
    fn test_validation_failures() {
        let mut config = NodeConfig::default();
        config.policy.min_metric_average = 6000;
        assert!(config.validate().is_err());

        let mut config = NodeConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        let mut config = NodeConfig::default();
        config.ledger.founding_guides = vec!["admin".to_string()];
        assert!(config.validate().is_err());

        let mut config = NodeConfig::default();
        config.ledger.founding_guides = vec!["ana".to_string(), "ana".to_string()];
        let err = config.validate().unwrap_err();
        assert!(format!("{:#}", err).contains("listed twice"));
    }
}
