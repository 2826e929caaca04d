use serde::Serialize;
use slot_lab_abstract::{ConfigError, SimConfig, SweepSpec};
use std::panic::resume_unwind;
use std::thread;
use tracing::info;

use crate::engine::Simulator;
use crate::error::SimError;
use crate::stats;
use crate::trace::SimulationReport;

/// Averages over the replications of one sweep point.
#[derive(Debug, Clone, Serialize)]
pub struct SweepPoint {
    pub arrival_prob: f64,
    pub replications: u32,
    pub mean_occupancy: f64,
    /// Mean of the replications' intervals; `None` if no replication had one.
    pub confidence_interval: Option<f64>,
    pub arrival_rate: f64,
}

/// Run `spec.replications` independent simulations for each arrival
/// probability of the sweep. Replications of a point run in parallel, at most
/// one batch of threads per available core at a time.
pub fn run_sweep(base: &SimConfig, spec: &SweepSpec) -> Result<Vec<SweepPoint>, SimError> {
    if spec.steps == 0 || spec.replications == 0 {
        return Err(ConfigError::EmptySweep.into());
    }

    let mut points = Vec::with_capacity(spec.steps as usize);
    for (point, arrival_prob) in spec.arrival_probabilities().enumerate() {
        let configs: Vec<SimConfig> = (0..spec.replications)
            .map(|rep| SimConfig {
                arrival_prob,
                seed: replication_seed(base.seed, point as u64, spec.replications, rep),
                record_trace: false,
                ..base.clone()
            })
            .collect();

        let reports = run_replications(configs)?;
        let summary = summarize(arrival_prob, &reports)?;
        info!(
            "lambda {:.3}: mean occupancy {:.4}, ci {:?}",
            summary.arrival_prob, summary.mean_occupancy, summary.confidence_interval
        );
        points.push(summary);
    }
    Ok(points)
}

fn replication_seed(base: u64, point: u64, replications: u32, rep: u32) -> u64 {
    base.wrapping_add(point * u64::from(replications) + u64::from(rep))
}

/// Threads running replications at once, whatever the replication count.
fn worker_count() -> usize {
    thread::available_parallelism()
        .map(|n| n.get().clamp(1, 16))
        .unwrap_or(4)
}

fn run_replications(configs: Vec<SimConfig>) -> Result<Vec<SimulationReport>, SimError> {
    let mut reports = Vec::with_capacity(configs.len());
    for batch in configs.chunks(worker_count()) {
        reports.extend(run_batch(batch)?);
    }
    Ok(reports)
}

fn run_batch(configs: &[SimConfig]) -> Result<Vec<SimulationReport>, SimError> {
    thread::scope(|scope| {
        let handles: Vec<_> = configs
            .iter()
            .map(|config| {
                scope.spawn(move || {
                    Simulator::new(config.clone()).and_then(|mut sim| sim.run_until_complete())
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|panic| resume_unwind(panic)))
            .collect()
    })
}

fn summarize(arrival_prob: f64, reports: &[SimulationReport]) -> Result<SweepPoint, SimError> {
    let means: Vec<f64> = reports.iter().map(|r| r.mean_occupancy).collect();
    let rates: Vec<f64> = reports.iter().map(|r| r.arrival_rate).collect();
    let intervals: Vec<f64> = reports.iter().filter_map(|r| r.confidence_interval).collect();

    Ok(SweepPoint {
        arrival_prob,
        replications: reports.len() as u32,
        mean_occupancy: stats::mean(&means)?,
        confidence_interval: stats::mean(&intervals).ok(),
        arrival_rate: stats::mean(&rates)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> SimConfig {
        SimConfig {
            slots: 200,
            seed: 3,
            ..Default::default()
        }
    }

    #[test]
    fn one_point_per_step() {
        let spec = SweepSpec {
            steps: 3,
            step: 0.1,
            replications: 4,
        };
        let points = run_sweep(&base(), &spec).unwrap();
        assert_eq!(points.len(), 3);
        for (k, point) in points.iter().enumerate() {
            assert!((point.arrival_prob - 0.1 * (k + 1) as f64).abs() < 1e-12);
            assert_eq!(point.replications, 4);
            assert!(point.mean_occupancy.is_finite());
            assert!(point.confidence_interval.is_some());
        }
    }

    #[test]
    fn sweep_is_reproducible() {
        let spec = SweepSpec {
            steps: 2,
            step: 0.2,
            replications: 3,
        };
        let a = run_sweep(&base(), &spec).unwrap();
        let b = run_sweep(&base(), &spec).unwrap();
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.mean_occupancy, y.mean_occupancy);
            assert_eq!(x.arrival_rate, y.arrival_rate);
        }
    }

    #[test]
    fn replications_get_distinct_seeds() {
        let seeds: Vec<u64> = (0..2)
            .flat_map(|point| (0..3).map(move |rep| replication_seed(10, point, 3, rep)))
            .collect();
        assert_eq!(seeds, vec![10, 11, 12, 13, 14, 15]);
    }

    #[test]
    fn replications_beyond_worker_count_run_in_batches() {
        let replications = worker_count() * 2 + 1;
        let configs: Vec<SimConfig> = (0..replications as u64)
            .map(|seed| SimConfig {
                slots: 20,
                seed,
                ..Default::default()
            })
            .collect();
        let reports = run_replications(configs).unwrap();
        assert_eq!(reports.len(), replications);
        for (seed, report) in reports.iter().enumerate() {
            assert_eq!(report.config.seed, seed as u64);
            assert_eq!(report.slots_run, 20);
        }
    }

    #[test]
    fn empty_sweep_is_rejected() {
        let spec = SweepSpec {
            steps: 0,
            step: 0.1,
            replications: 1,
        };
        assert_eq!(
            run_sweep(&base(), &spec).unwrap_err(),
            SimError::InvalidConfig(ConfigError::EmptySweep)
        );
    }

    #[test]
    fn out_of_range_step_fails_the_run() {
        let spec = SweepSpec {
            steps: 2,
            step: 0.8,
            replications: 1,
        };
        assert!(matches!(
            run_sweep(&base(), &spec),
            Err(SimError::InvalidConfig(ConfigError::ProbabilityOutOfRange { .. }))
        ));
    }
}
