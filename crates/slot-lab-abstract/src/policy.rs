use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Matching policy used by the scheduler for a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulingPolicy {
    /// Rotate over queues, one candidate per slot, server 1 only.
    RoundRobin,
    /// One random queue against a random subset of servers.
    RandomSingle,
    /// Longest-connected queue, server 1 only.
    LcqSingle,
    /// Queues in identity order against a random subset of servers.
    RandomMulti,
    /// Longest-connected queue first against a random subset of servers.
    AsLcq,
    /// Longest-connected queue first, least-connected server first.
    #[default]
    LcsLcq,
}

impl SchedulingPolicy {
    pub const ALL: [SchedulingPolicy; 6] = [
        SchedulingPolicy::RoundRobin,
        SchedulingPolicy::RandomSingle,
        SchedulingPolicy::LcqSingle,
        SchedulingPolicy::RandomMulti,
        SchedulingPolicy::AsLcq,
        SchedulingPolicy::LcsLcq,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SchedulingPolicy::RoundRobin => "round_robin",
            SchedulingPolicy::RandomSingle => "random_single",
            SchedulingPolicy::LcqSingle => "lcq_single",
            SchedulingPolicy::RandomMulti => "random_multi",
            SchedulingPolicy::AsLcq => "as_lcq",
            SchedulingPolicy::LcsLcq => "lcs_lcq",
        }
    }

    /// Policies that only ever drive server 1.
    pub fn is_single_server(&self) -> bool {
        matches!(
            self,
            SchedulingPolicy::RoundRobin | SchedulingPolicy::LcqSingle
        )
    }
}

impl fmt::Display for SchedulingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SchedulingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|p| p.name() == normalized)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|p| p.name()).collect();
                format!("Unknown policy '{s}'. Try one of: {}", known.join(", "))
            })
    }
}
