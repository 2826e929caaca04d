//! Per-slot matching of queues to servers.
//!
//! Every policy obeys the same eligibility rule: the link is up for this
//! slot, the queue has a pending packet, the server is idle, and neither side
//! has been matched yet in this slot. Policies only differ in the order in
//! which they try candidate pairs.

use rand::Rng;
use serde::Serialize;
use slot_lab_abstract::SchedulingPolicy;
use std::collections::BTreeSet;
use tracing::debug;

use crate::connectivity::ConnectivityGrid;
use crate::error::SimError;
use crate::ids::{QueueId, ServerId};
use crate::queue::SimQueue;
use crate::server::SimServer;
use crate::state::RunState;

/// One queue served by one server in one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub queue: QueueId,
    pub server: ServerId,
    /// Slots the served packet waited.
    pub delay: u64,
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    policy: SchedulingPolicy,
    round_robin_cursor: usize,
}

impl Scheduler {
    pub fn new(policy: SchedulingPolicy) -> Self {
        Self {
            policy,
            round_robin_cursor: 0,
        }
    }

    pub fn policy(&self) -> SchedulingPolicy {
        self.policy
    }

    /// Run the configured policy against the current slot's grid.
    ///
    /// Matched queues lose their oldest packet and matched servers go busy.
    pub fn schedule<R: Rng>(
        &mut self,
        state: &mut RunState,
        rng: &mut R,
    ) -> Result<Vec<Assignment>, SimError> {
        let queue_count = state.queues.len();
        let server_count = state.servers.len();
        let first_server = ServerId(1);

        match self.policy {
            SchedulingPolicy::RoundRobin => {
                self.round_robin_cursor = (self.round_robin_cursor + 1) % queue_count;
                let queue = QueueId::from_index(self.round_robin_cursor);
                let mut slot = SlotMatching::new(state);
                slot.try_match(queue, first_server)?;
                Ok(slot.finish())
            }
            SchedulingPolicy::RandomSingle => {
                let selected = select_random_servers(server_count, rng);
                let queue = QueueId::from_index(rng.random_range(0..queue_count));
                let mut slot = SlotMatching::new(state);
                for server in selected {
                    if slot.try_match(queue, server)? {
                        break;
                    }
                }
                Ok(slot.finish())
            }
            SchedulingPolicy::LcqSingle => {
                let order = sorted_queues(&state.queues);
                let mut slot = SlotMatching::new(state);
                for queue in order.into_iter().rev() {
                    if slot.try_match(queue, first_server)? {
                        break;
                    }
                }
                Ok(slot.finish())
            }
            SchedulingPolicy::RandomMulti => {
                let selected = select_random_servers(server_count, rng);
                let mut slot = SlotMatching::new(state);
                slot.fill((0..queue_count).map(QueueId::from_index), &selected)?;
                Ok(slot.finish())
            }
            SchedulingPolicy::AsLcq => {
                let selected = select_random_servers(server_count, rng);
                let order = sorted_queues(&state.queues);
                let mut slot = SlotMatching::new(state);
                slot.fill(order.into_iter().rev(), &selected)?;
                Ok(slot.finish())
            }
            SchedulingPolicy::LcsLcq => {
                let queue_order = sorted_queues(&state.queues);
                let server_order = sorted_servers(&state.servers);
                let mut slot = SlotMatching::new(state);
                slot.fill(queue_order.into_iter().rev(), &server_order)?;
                Ok(slot.finish())
            }
        }
    }
}

/// Draw `count` server ids uniformly from `1..=count`. Duplicates collapse
/// and the subset comes back in ascending id order.
pub fn select_random_servers<R: Rng>(count: usize, rng: &mut R) -> Vec<ServerId> {
    let chosen: BTreeSet<ServerId> = (0..count)
        .map(|_| ServerId::from_index(rng.random_range(0..count)))
        .collect();
    chosen.into_iter().collect()
}

/// Queue ids ordered by ascending connection count. Ties keep id order.
pub fn sorted_queues(queues: &[SimQueue]) -> Vec<QueueId> {
    sort_by_connections(queues.iter().map(|q| (q.id(), q.connections())).collect())
}

/// Server ids ordered by ascending connection count. Ties keep id order.
pub fn sorted_servers(servers: &[SimServer]) -> Vec<ServerId> {
    sort_by_connections(servers.iter().map(|s| (s.id(), s.connections())).collect())
}

fn sort_by_connections<T>(mut snapshot: Vec<(T, u32)>) -> Vec<T> {
    // stable: equal counts stay in id order
    snapshot.sort_by_key(|(_, connections)| *connections);
    snapshot.into_iter().map(|(id, _)| id).collect()
}

/// Mutable view of one slot while a policy is matching.
struct SlotMatching<'a> {
    slot: u64,
    grid: &'a ConnectivityGrid,
    queues: &'a mut [SimQueue],
    servers: &'a mut [SimServer],
    queue_matched: Vec<bool>,
    assignments: Vec<Assignment>,
}

impl<'a> SlotMatching<'a> {
    fn new(state: &'a mut RunState) -> Self {
        let RunState {
            slot,
            queues,
            servers,
            grid,
            ..
        } = state;
        Self {
            slot: *slot,
            grid,
            queue_matched: vec![false; queues.len()],
            queues,
            servers,
            assignments: Vec::new(),
        }
    }

    fn is_eligible(&self, queue: QueueId, server: ServerId) -> bool {
        self.grid.is_connected(queue, server)
            && !self.queue_matched[queue.index()]
            && self.queues[queue.index()].pending() > 0
            && !self.servers[server.index()].is_busy()
    }

    /// Match `queue` to `server` if the pair is eligible. Returns whether it matched.
    fn try_match(&mut self, queue: QueueId, server: ServerId) -> Result<bool, SimError> {
        if !self.is_eligible(queue, server) {
            return Ok(false);
        }

        let delay = self.queues[queue.index()].pop_packet(self.slot)?;
        let target = &mut self.servers[server.index()];
        target.go_busy();
        target.add_served_queue(queue);
        self.queue_matched[queue.index()] = true;

        debug!(
            "slot {}: {} -> {} (waited {} slots)",
            self.slot, queue, server, delay
        );
        self.assignments.push(Assignment {
            queue,
            server,
            delay,
        });
        Ok(true)
    }

    /// Walk queues in `queue_order`; each takes the first eligible server from
    /// `servers`. Stops once every listed server is used.
    fn fill(
        &mut self,
        queue_order: impl Iterator<Item = QueueId>,
        servers: &[ServerId],
    ) -> Result<(), SimError> {
        let mut free = servers.len();
        for queue in queue_order {
            if free == 0 {
                break;
            }
            for &server in servers {
                if self.try_match(queue, server)? {
                    free -= 1;
                    break;
                }
            }
        }
        Ok(())
    }

    fn finish(self) -> Vec<Assignment> {
        self.assignments
    }
}
