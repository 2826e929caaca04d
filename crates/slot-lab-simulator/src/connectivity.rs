use rand::Rng;

use crate::ids::{QueueId, ServerId};
use crate::queue::SimQueue;
use crate::server::SimServer;

/// Queue × server link status for one slot, stored row-major by queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectivityGrid {
    queues: usize,
    servers: usize,
    links: Vec<bool>,
}

impl ConnectivityGrid {
    /// A grid with every link down.
    pub fn disconnected(queues: usize, servers: usize) -> Self {
        Self {
            queues,
            servers,
            links: vec![false; queues * servers],
        }
    }

    /// Draw a fresh grid with one Bernoulli(`prob`) trial per link.
    ///
    /// Connection counts on `queues` and `servers` are reset and then
    /// incremented once per connected incident link.
    pub fn draw<R: Rng>(
        prob: f64,
        queues: &mut [SimQueue],
        servers: &mut [SimServer],
        rng: &mut R,
    ) -> Self {
        Self::build(queues, servers, |_, _| rng.random::<f64>() < prob)
    }

    /// Grid with explicit link rows, one `&[bool]` per queue.
    #[cfg(test)]
    pub(crate) fn from_rows(rows: &[&[bool]], queues: &mut [SimQueue], servers: &mut [SimServer]) -> Self {
        Self::build(queues, servers, |q, s| rows[q][s])
    }

    fn build(
        queues: &mut [SimQueue],
        servers: &mut [SimServer],
        mut link_up: impl FnMut(usize, usize) -> bool,
    ) -> Self {
        for queue in queues.iter_mut() {
            queue.reset_connections();
        }
        for server in servers.iter_mut() {
            server.reset_connections();
        }

        let mut grid = Self::disconnected(queues.len(), servers.len());
        for (q, queue) in queues.iter_mut().enumerate() {
            for (s, server) in servers.iter_mut().enumerate() {
                if link_up(q, s) {
                    grid.links[q * grid.servers + s] = true;
                    queue.increment_connections();
                    server.increment_connections();
                }
            }
        }
        grid
    }

    pub fn is_connected(&self, queue: QueueId, server: ServerId) -> bool {
        self.links[queue.index() * self.servers + server.index()]
    }

    pub fn queue_degree(&self, queue: QueueId) -> usize {
        let row = queue.index() * self.servers;
        self.links[row..row + self.servers].iter().filter(|l| **l).count()
    }

    pub fn server_degree(&self, server: ServerId) -> usize {
        (0..self.queues)
            .filter(|q| self.links[q * self.servers + server.index()])
            .count()
    }

    pub fn connected_links(&self) -> usize {
        self.links.iter().filter(|l| **l).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn fleet(queues: usize, servers: usize) -> (Vec<SimQueue>, Vec<SimServer>) {
        (
            (0..queues).map(|i| SimQueue::new(QueueId::from_index(i))).collect(),
            (0..servers).map(|i| SimServer::new(ServerId::from_index(i))).collect(),
        )
    }

    #[test]
    fn counts_match_grid_degrees() {
        let (mut queues, mut servers) = fleet(6, 4);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let grid = ConnectivityGrid::draw(0.5, &mut queues, &mut servers, &mut rng);
            for q in &queues {
                assert_eq!(q.connections() as usize, grid.queue_degree(q.id()));
            }
            for s in &servers {
                assert_eq!(s.connections() as usize, grid.server_degree(s.id()));
            }
            let total: u32 = queues.iter().map(|q| q.connections()).sum();
            assert_eq!(total as usize, grid.connected_links());
        }
    }

    #[test]
    fn extreme_probabilities() {
        let (mut queues, mut servers) = fleet(3, 2);
        let mut rng = StdRng::seed_from_u64(1);

        let grid = ConnectivityGrid::draw(1.0, &mut queues, &mut servers, &mut rng);
        assert_eq!(grid.connected_links(), 6);
        assert!(queues.iter().all(|q| q.connections() == 2));

        let grid = ConnectivityGrid::draw(0.0, &mut queues, &mut servers, &mut rng);
        assert_eq!(grid, ConnectivityGrid::disconnected(3, 2));
        assert!(queues.iter().all(|q| q.connections() == 0));
        assert!(servers.iter().all(|s| s.connections() == 0));
    }

    #[test]
    fn explicit_rows() {
        let (mut queues, mut servers) = fleet(2, 3);
        let grid = ConnectivityGrid::from_rows(
            &[&[true, false, true], &[false, false, true]],
            &mut queues,
            &mut servers,
        );
        assert!(grid.is_connected(QueueId(1), ServerId(3)));
        assert!(!grid.is_connected(QueueId(2), ServerId(1)));
        assert_eq!(queues[0].connections(), 2);
        assert_eq!(servers[2].connections(), 2);
        assert_eq!(servers[1].connections(), 0);
    }
}
