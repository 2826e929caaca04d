use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use slot_lab_abstract::{CorrelationBounds, SchedulingPolicy, SimConfig, SweepSpec};
use slot_lab_simulator::scenario_runner::{self, ScenarioOutcome};
use slot_lab_simulator::sweep::run_sweep;
use slot_lab_simulator::{SimulationReport, Simulator, SweepPoint};

#[derive(Parser, Debug)]
#[command(author, version, about = "Slotted multi-queue scheduling simulator")]
struct Args {
    /// Load a scenario from disk; the other run flags are ignored.
    #[arg(long)]
    scenario: Option<PathBuf>,

    #[arg(long, default_value_t = 5)]
    queues: usize,
    #[arg(long, default_value_t = 3)]
    servers: usize,
    #[arg(long, default_value_t = 50_000)]
    slots: u64,

    /// Probability that a queue-server link is up in a slot.
    #[arg(long, default_value_t = 0.8)]
    connectivity: f64,

    /// Per-queue packet arrival probability.
    #[arg(long, default_value_t = 0.5)]
    arrival: f64,

    /// Lower correlation bound: steps are drawn from [-a, b).
    #[arg(long, default_value_t = 0.1, allow_negative_numbers = true)]
    corr_a: f64,
    #[arg(long, default_value_t = 0.1, allow_negative_numbers = true)]
    corr_b: f64,

    /// round_robin, random_single, lcq_single, random_multi, as_lcq or lcs_lcq.
    #[arg(long, default_value_t = SchedulingPolicy::LcsLcq)]
    policy: SchedulingPolicy,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Sweep the arrival probability over this many points instead of a single run.
    #[arg(long)]
    sweep_steps: Option<u32>,
    #[arg(long, default_value_t = 0.02)]
    sweep_step: f64,
    #[arg(long, default_value_t = 20)]
    replications: u32,

    /// Record a per-slot trace in the written report.
    #[arg(long, default_value_t = false)]
    trace: bool,

    /// Write the JSON report of the finished run or sweep.
    #[arg(long)]
    report_out: Option<PathBuf>,
}

impl Args {
    fn sim_config(&self) -> SimConfig {
        SimConfig {
            queues: self.queues,
            servers: self.servers,
            slots: self.slots,
            connectivity_prob: self.connectivity,
            arrival_prob: self.arrival,
            correlation: CorrelationBounds::new(self.corr_a, self.corr_b),
            policy: self.policy,
            seed: self.seed,
            record_trace: self.trace,
        }
    }

    fn sweep_spec(&self) -> Option<SweepSpec> {
        self.sweep_steps.map(|steps| SweepSpec {
            steps,
            step: self.sweep_step,
            replications: self.replications,
        })
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt::init();
    info!("slot-lab starting…");

    let outcome = if let Some(path) = &args.scenario {
        scenario_runner::run_scenario(path)?
    } else if let Some(spec) = args.sweep_spec() {
        let points = run_sweep(&args.sim_config(), &spec).context("Sweep failed")?;
        ScenarioOutcome::Sweep { points }
    } else {
        let report = Simulator::new(args.sim_config())?
            .run_until_complete()
            .context("Simulation failed")?;
        ScenarioOutcome::Single { report }
    };

    match &outcome {
        ScenarioOutcome::Single { report } => print_report(report),
        ScenarioOutcome::Sweep { points } => print_sweep(points),
    }

    if let Some(path) = &args.report_out {
        write_json(path, &outcome)?;
    }

    Ok(())
}

fn print_report(report: &SimulationReport) {
    println!("Queue\tAverage Occupancy\tServed\tMean Delay");
    for q in &report.queues {
        let delay = q
            .mean_delay
            .map_or_else(|| "-".to_string(), |d| format!("{d:.3}"));
        println!("{}\t{:.4}\t{}\t{}", q.id.0, q.average_occupancy, q.served, delay);
    }
    let ci = report
        .confidence_interval
        .map_or_else(|| "-".to_string(), |ci| format!("{ci:.4}"));
    println!("Mean occupancy: {:.4}", report.mean_occupancy);
    println!("Confidence interval: {ci}");
    println!(
        "Packet arrival rate: {}/{} = {:.4}",
        report.packets_arrived, report.packets_attempted, report.arrival_rate
    );
    println!("Throughput: {:.4} packets/slot", report.throughput);
}

fn print_sweep(points: &[SweepPoint]) {
    println!("Lambda\tAverage Occupancy\tConfidence Interval");
    for point in points {
        let ci = point
            .confidence_interval
            .map_or_else(|| "-".to_string(), |ci| format!("{ci}"));
        println!("{}\t{}\t{}", point.arrival_prob, point.mean_occupancy, ci);
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let data = serde_json::to_vec_pretty(value).context("Failed to serialize report")?;
    fs::write(path, &data)
        .with_context(|| format!("Failed to write report file {}", path.display()))?;
    Ok(())
}
