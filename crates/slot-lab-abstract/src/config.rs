use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::policy::SchedulingPolicy;

/// Reasons a [`SimConfig`] is rejected before a run starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("slot count must be at least 1")]
    ZeroSlots,
    #[error("queue count must be at least 1")]
    ZeroQueues,
    #[error("server count must be at least 1")]
    ZeroServers,
    #[error("{name} probability must lie in [0, 1], got {value}")]
    ProbabilityOutOfRange { name: &'static str, value: f64 },
    #[error("correlation bounds must be finite with -a <= b, got a={a} b={b}")]
    InvalidCorrelation { a: f64, b: f64 },
    #[error("sweep needs at least one step and one replication")]
    EmptySweep,
}

/// Perturbation range of the correlated arrival source.
///
/// Each step draws uniformly from `[-a, b)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationBounds {
    pub a: f64,
    pub b: f64,
}

impl CorrelationBounds {
    pub fn new(a: f64, b: f64) -> Self {
        Self { a, b }
    }

    pub fn lower(&self) -> f64 {
        -self.a
    }

    pub fn upper(&self) -> f64 {
        self.b
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.a.is_finite() || !self.b.is_finite() || self.lower() > self.upper() {
            return Err(ConfigError::InvalidCorrelation {
                a: self.a,
                b: self.b,
            });
        }
        Ok(())
    }
}

impl Default for CorrelationBounds {
    fn default() -> Self {
        Self { a: 0.1, b: 0.1 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    pub queues: usize,
    pub servers: usize,
    pub slots: u64,
    pub connectivity_prob: f64,
    pub arrival_prob: f64,
    pub correlation: CorrelationBounds,
    pub policy: SchedulingPolicy,
    pub seed: u64,
    /// Keep a per-slot trace of matches and arrivals in the report.
    pub record_trace: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            queues: 5,
            servers: 3,
            slots: 50_000,
            connectivity_prob: 0.8,
            arrival_prob: 0.5,
            correlation: CorrelationBounds::default(),
            policy: SchedulingPolicy::default(),
            seed: 0,
            record_trace: false,
        }
    }
}

impl SimConfig {
    /// Check every parameter; nothing is built from a config that fails here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slots == 0 {
            return Err(ConfigError::ZeroSlots);
        }
        if self.queues == 0 {
            return Err(ConfigError::ZeroQueues);
        }
        if self.servers == 0 {
            return Err(ConfigError::ZeroServers);
        }
        check_probability("connectivity", self.connectivity_prob)?;
        check_probability("arrival", self.arrival_prob)?;
        self.correlation.validate()
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ProbabilityOutOfRange { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(SimConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_zero_counts() {
        let config = SimConfig {
            slots: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroSlots));

        let config = SimConfig {
            queues: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroQueues));

        let config = SimConfig {
            servers: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroServers));
    }

    #[test]
    fn rejects_bad_probabilities() {
        let config = SimConfig {
            arrival_prob: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ProbabilityOutOfRange { name: "arrival", .. })
        ));

        let config = SimConfig {
            connectivity_prob: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ProbabilityOutOfRange {
                name: "connectivity",
                ..
            })
        ));
    }

    #[test]
    fn probability_edges_are_accepted() {
        let config = SimConfig {
            connectivity_prob: 0.0,
            arrival_prob: 1.0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_inverted_correlation() {
        let config = SimConfig {
            correlation: CorrelationBounds::new(-0.4, 0.1),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCorrelation { .. })
        ));
    }
}
