use serde::Serialize;
use slot_lab_abstract::SimConfig;

use crate::ids::{QueueId, ServerId};
use crate::scheduler::Assignment;

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub config: SimConfig,
    pub slots_run: u64,
    pub mean_occupancy: f64,
    /// `None` when fewer than two queues exist.
    pub confidence_interval: Option<f64>,
    pub packets_arrived: u64,
    pub packets_attempted: u64,
    pub arrival_rate: f64,
    /// Packets served per slot across all servers.
    pub throughput: f64,
    pub queues: Vec<QueueReport>,
    pub servers: Vec<ServerReport>,
    /// Per-slot trace, only filled when `config.record_trace` is set.
    pub slots: Vec<SlotSummary>,
}

impl SimulationReport {
    pub fn queue_means(&self) -> Vec<f64> {
        self.queues.iter().map(|q| q.average_occupancy).collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QueueReport {
    pub id: QueueId,
    pub average_occupancy: f64,
    pub total_occupancy: u64,
    pub pending: usize,
    pub served: usize,
    pub mean_delay: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerReport {
    pub id: ServerId,
    pub served: usize,
    /// Index `i` counts packets taken from queue `i + 1`.
    pub served_by_queue: Vec<usize>,
}

/// What happened in one slot.
#[derive(Debug, Clone, Serialize)]
pub struct SlotSummary {
    pub slot: u64,
    pub connected_links: usize,
    pub assignments: Vec<Assignment>,
    pub arrivals: Vec<QueueId>,
    pub pending_before_arrivals: usize,
    pub pending_after_arrivals: usize,
}
