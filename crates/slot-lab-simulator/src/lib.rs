pub mod connectivity;
pub mod engine;
pub mod error;
pub mod ids;
pub mod queue;
pub mod random;
pub mod scheduler;
pub mod server;
pub mod state;
pub mod stats;

pub mod scenario_runner;
pub mod sweep;
pub mod trace;

pub use engine::Simulator;
pub use error::SimError;
pub use ids::{QueueId, ServerId};
pub use scheduler::{Assignment, Scheduler};
pub use sweep::SweepPoint;
pub use trace::SimulationReport;
