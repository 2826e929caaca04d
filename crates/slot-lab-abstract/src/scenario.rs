use crate::config::{CorrelationBounds, SimConfig};
use crate::policy::SchedulingPolicy;
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub config: SimConfigOverride,
    /// When present the scenario runs an arrival-probability sweep instead of a single run.
    pub sweep: Option<SweepSpec>,
    #[serde(default)]
    pub assertions: Vec<RunAssertion>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct SimConfigOverride {
    pub queues: Option<usize>,
    pub servers: Option<usize>,
    pub slots: Option<u64>,
    pub connectivity_prob: Option<f64>,
    pub arrival_prob: Option<f64>,
    pub correlation_a: Option<f64>,
    pub correlation_b: Option<f64>,
    pub policy: Option<SchedulingPolicy>,
    pub seed: Option<u64>,
    pub record_trace: Option<bool>,
}

impl SimConfigOverride {
    pub fn apply_to(&self, config: &mut SimConfig) {
        if let Some(v) = self.queues {
            config.queues = v;
        }
        if let Some(v) = self.servers {
            config.servers = v;
        }
        if let Some(v) = self.slots {
            config.slots = v;
        }
        if let Some(v) = self.connectivity_prob {
            config.connectivity_prob = v;
        }
        if let Some(v) = self.arrival_prob {
            config.arrival_prob = v;
        }
        if self.correlation_a.is_some() || self.correlation_b.is_some() {
            config.correlation = CorrelationBounds::new(
                self.correlation_a.unwrap_or(config.correlation.a),
                self.correlation_b.unwrap_or(config.correlation.b),
            );
        }
        if let Some(v) = self.policy {
            config.policy = v;
        }
        if let Some(v) = self.seed {
            config.seed = v;
        }
        if let Some(v) = self.record_trace {
            config.record_trace = v;
        }
    }
}

/// Arrival-probability sweep: point `k` (1-based) runs with `arrival_prob = k * step`.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct SweepSpec {
    pub steps: u32,
    pub step: f64,
    #[serde(default = "default_replications")]
    pub replications: u32,
}

fn default_replications() -> u32 {
    20
}

impl Default for SweepSpec {
    fn default() -> Self {
        Self {
            steps: 10,
            step: 0.02,
            replications: default_replications(),
        }
    }
}

impl SweepSpec {
    pub fn arrival_probabilities(&self) -> impl Iterator<Item = f64> + '_ {
        (1..=self.steps).map(|k| f64::from(k) * self.step)
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunAssertion {
    /// Overall mean occupancy is within range
    MeanOccupancy { min: f64, max: Option<f64> },
    /// Fraction of attempted arrivals that succeeded is within range
    ArrivalRate { min: f64, max: Option<f64> },
    /// Confidence-interval statistic does not exceed `max`
    ConfidenceIntervalMax { max: f64 },
    /// Mean occupancy of one queue (1-based id) is within range
    QueueOccupancy {
        queue: usize,
        min: Option<f64>,
        max: Option<f64>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_touches_only_given_fields() {
        let mut config = SimConfig::default();
        let over = SimConfigOverride {
            servers: Some(1),
            correlation_b: Some(0.3),
            policy: Some(SchedulingPolicy::RoundRobin),
            ..Default::default()
        };
        over.apply_to(&mut config);

        assert_eq!(config.servers, 1);
        assert_eq!(config.queues, 5);
        assert_eq!(config.correlation, CorrelationBounds::new(0.1, 0.3));
        assert_eq!(config.policy, SchedulingPolicy::RoundRobin);
    }

    #[test]
    fn sweep_points_scale_with_step() {
        let spec = SweepSpec {
            steps: 3,
            step: 0.25,
            replications: 1,
        };
        let points: Vec<f64> = spec.arrival_probabilities().collect();
        assert_eq!(points, vec![0.25, 0.5, 0.75]);
    }
}
