pub mod config;
pub mod policy;
pub mod scenario;

pub use config::{ConfigError, CorrelationBounds, SimConfig};
pub use policy::SchedulingPolicy;
pub use scenario::{RunAssertion, Scenario, SimConfigOverride, SweepSpec};
