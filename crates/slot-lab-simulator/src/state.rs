use rand::Rng;
use slot_lab_abstract::CorrelationBounds;

use crate::connectivity::ConnectivityGrid;
use crate::ids::{QueueId, ServerId};
use crate::queue::{Packet, SimQueue};
use crate::random::CorrelatedSource;
use crate::server::SimServer;

/// Everything one run owns. Built fresh for every run and never shared.
#[derive(Debug, Clone)]
pub struct RunState {
    pub(crate) slot: u64,
    pub(crate) queues: Vec<SimQueue>,
    pub(crate) servers: Vec<SimServer>,
    pub(crate) grid: ConnectivityGrid,
    pub(crate) source: CorrelatedSource,
    pub(crate) packets_arrived: u64,
    pub(crate) packets_attempted: u64,
}

impl RunState {
    pub fn new(queues: usize, servers: usize, bounds: CorrelationBounds, source_seed: u64) -> Self {
        Self {
            slot: 0,
            queues: (0..queues).map(|i| SimQueue::new(QueueId::from_index(i))).collect(),
            servers: (0..servers)
                .map(|i| SimServer::new(ServerId::from_index(i)))
                .collect(),
            grid: ConnectivityGrid::disconnected(queues, servers),
            source: CorrelatedSource::new(bounds, source_seed),
            packets_arrived: 0,
            packets_attempted: 0,
        }
    }

    /// Replace the grid with a freshly drawn one.
    pub fn refresh_connectivity<R: Rng>(&mut self, prob: f64, rng: &mut R) {
        self.grid = ConnectivityGrid::draw(prob, &mut self.queues, &mut self.servers, rng);
    }

    /// Replace the grid with explicit link rows, one per queue.
    #[cfg(test)]
    pub(crate) fn set_connectivity(&mut self, rows: &[&[bool]]) {
        self.grid = ConnectivityGrid::from_rows(rows, &mut self.queues, &mut self.servers);
    }

    /// One Bernoulli draw per queue. Packets become eligible in the next slot.
    ///
    /// A lone server is fed from the plain stream; with several servers the
    /// folded correlated stream is used instead.
    pub fn generate_arrivals(&mut self, prob: f64) -> Vec<QueueId> {
        let single_server = self.servers.len() == 1;
        let eligible_from = self.slot + 1;
        let mut arrived = Vec::new();
        for queue in &mut self.queues {
            let hit = if single_server {
                self.source.next_bernoulli(prob)
            } else {
                self.source.next_bernoulli_correlated(prob)
            };
            self.packets_attempted += 1;
            if hit {
                queue.add_packet(Packet::new(eligible_from));
                self.packets_arrived += 1;
                arrived.push(queue.id());
            }
        }
        arrived
    }

    pub fn record_occupancies(&mut self) {
        for queue in &mut self.queues {
            queue.record_occupancy();
        }
    }

    pub fn release_servers(&mut self) {
        for server in &mut self.servers {
            server.go_idle();
        }
    }

    pub fn slot(&self) -> u64 {
        self.slot
    }

    pub fn queues(&self) -> &[SimQueue] {
        &self.queues
    }

    pub fn queue(&self, id: QueueId) -> &SimQueue {
        &self.queues[id.index()]
    }

    /// Queue access for seeding backlog by hand.
    #[cfg(test)]
    pub(crate) fn queue_mut(&mut self, id: QueueId) -> &mut SimQueue {
        &mut self.queues[id.index()]
    }

    pub fn servers(&self) -> &[SimServer] {
        &self.servers
    }

    pub fn server(&self, id: ServerId) -> &SimServer {
        &self.servers[id.index()]
    }

    pub fn grid(&self) -> &ConnectivityGrid {
        &self.grid
    }

    pub fn pending_total(&self) -> usize {
        self.queues.iter().map(SimQueue::pending).sum()
    }

    pub fn packets_arrived(&self) -> u64 {
        self.packets_arrived
    }

    pub fn packets_attempted(&self) -> u64 {
        self.packets_attempted
    }
}
