use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use slot_lab_abstract::SimConfig;
use tracing::{debug, info, warn};

use crate::error::SimError;
use crate::ids::QueueId;
use crate::scheduler::Scheduler;
use crate::state::RunState;
use crate::stats;
use crate::trace::{QueueReport, ServerReport, SimulationReport, SlotSummary};

pub struct Simulator {
    config: SimConfig,
    rng: StdRng,
    scheduler: Scheduler,
    state: RunState,
    primed: bool,

    /// Per-slot summaries, kept only when `config.record_trace` is set.
    pub slot_events: Vec<SlotSummary>,
}

impl Simulator {
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        let (rng, state) = fresh_run(&config);

        if config.policy.is_single_server() && config.servers > 1 {
            warn!(
                "{} only drives server 1; {} other servers will stay idle",
                config.policy,
                config.servers - 1
            );
        }

        Ok(Self {
            scheduler: Scheduler::new(config.policy),
            config,
            rng,
            state,
            primed: false,
            slot_events: Vec::new(),
        })
    }

    /// Expose current simulation config
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn current_slot(&self) -> u64 {
        self.state.slot
    }

    /// Throw away all run state and start over from the configured seed.
    pub fn reset(&mut self) {
        let (rng, state) = fresh_run(&self.config);
        self.rng = rng;
        self.state = state;
        self.scheduler = Scheduler::new(self.config.policy);
        self.primed = false;
        self.slot_events.clear();
    }

    /// Priming arrivals so the first slot can already have work.
    pub fn init(&mut self) {
        if self.primed {
            return;
        }
        let arrived = self.state.generate_arrivals(self.config.arrival_prob);
        debug!("Priming arrivals: {} packets", arrived.len());
        self.primed = true;
    }

    /// Advance one slot. Returns `Ok(false)` once every configured slot has run.
    pub fn step(&mut self) -> Result<bool, SimError> {
        if self.state.slot >= self.config.slots {
            return Ok(false);
        }
        self.init();

        self.state.slot += 1;
        let slot = self.state.slot;

        self.state
            .refresh_connectivity(self.config.connectivity_prob, &mut self.rng);
        let assignments = self.scheduler.schedule(&mut self.state, &mut self.rng)?;
        self.state.record_occupancies();

        let pending_before_arrivals = self.state.pending_total();
        let arrivals = self.state.generate_arrivals(self.config.arrival_prob);
        let pending_after_arrivals = self.state.pending_total();

        self.state.release_servers();

        debug!(
            "slot {}: {} links up, {} matched, {} arrived, {} pending",
            slot,
            self.state.grid.connected_links(),
            assignments.len(),
            arrivals.len(),
            pending_after_arrivals
        );

        if self.config.record_trace {
            self.slot_events.push(SlotSummary {
                slot,
                connected_links: self.state.grid.connected_links(),
                assignments,
                arrivals,
                pending_before_arrivals,
                pending_after_arrivals,
            });
        }
        Ok(true)
    }

    /// Reset, prime, run every slot and aggregate.
    pub fn run_until_complete(&mut self) -> Result<SimulationReport, SimError> {
        self.reset();
        info!(
            "Running {} slots: {} queues, {} servers, policy {}",
            self.config.slots, self.config.queues, self.config.servers, self.config.policy
        );
        self.init();
        while self.step()? {}

        let report = self.export_report()?;
        info!(
            "Run complete: mean occupancy {:.4}, arrivals {}/{}",
            report.mean_occupancy, report.packets_arrived, report.packets_attempted
        );
        Ok(report)
    }

    /// Aggregate statistics over the slots run so far.
    pub fn export_report(&self) -> Result<SimulationReport, SimError> {
        let slots_run = self.state.slot;
        let averages = stats::average_occupancies(&self.state.queues, slots_run)?;
        let mean_occupancy = stats::mean(&averages)?;
        let confidence_interval = match stats::confidence_interval(&averages, mean_occupancy) {
            Ok(ci) => Some(ci),
            Err(err) => {
                warn!("No occupancy confidence interval: {}", err);
                None
            }
        };

        let queues: Vec<QueueReport> = self
            .state
            .queues
            .iter()
            .zip(&averages)
            .map(|(q, &average_occupancy)| QueueReport {
                id: q.id(),
                average_occupancy,
                total_occupancy: q.total_occupancy(),
                pending: q.pending(),
                served: q.served(),
                mean_delay: q.mean_delay(),
            })
            .collect();

        let servers = self
            .state
            .servers
            .iter()
            .map(|s| {
                let mut served_by_queue = vec![0; self.state.queues.len()];
                for queue in s.queues_served() {
                    served_by_queue[queue.index()] += 1;
                }
                ServerReport {
                    id: s.id(),
                    served: s.queues_served().len(),
                    served_by_queue,
                }
            })
            .collect();

        let served: usize = queues.iter().map(|q| q.served).sum();

        Ok(SimulationReport {
            config: self.config.clone(),
            slots_run,
            mean_occupancy,
            confidence_interval,
            packets_arrived: self.state.packets_arrived,
            packets_attempted: self.state.packets_attempted,
            arrival_rate: stats::ratio(self.state.packets_arrived, self.state.packets_attempted),
            throughput: stats::ratio(served as u64, slots_run),
            queues,
            servers,
            slots: self.slot_events.clone(),
        })
    }

    /// Pending count of one queue (1-based id).
    pub fn pending(&self, queue: QueueId) -> usize {
        self.state.queue(queue).pending()
    }
}

fn fresh_run(config: &SimConfig) -> (StdRng, RunState) {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let source_seed = rng.random::<u64>();
    let state = RunState::new(
        config.queues,
        config.servers,
        config.correlation,
        source_seed,
    );
    (rng, state)
}
