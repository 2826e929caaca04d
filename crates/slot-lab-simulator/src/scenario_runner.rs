use anyhow::{Context, anyhow, bail};
use serde::Serialize;
use slot_lab_abstract::{RunAssertion, Scenario, SimConfig};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::engine::Simulator;
use crate::sweep::{SweepPoint, run_sweep};
use crate::trace::SimulationReport;

/// Result of a scenario: a single run, or one point per sweep step.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScenarioOutcome {
    Single { report: SimulationReport },
    Sweep { points: Vec<SweepPoint> },
}

pub fn load_scenario(path: &Path) -> anyhow::Result<Scenario> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
    let scenario: Scenario = toml::from_str(&content).context("Failed to parse scenario")?;
    Ok(scenario)
}

pub fn run_scenario(scenario_path: &Path) -> anyhow::Result<ScenarioOutcome> {
    let scenario = load_scenario(scenario_path)?;
    run_loaded(&scenario)
}

pub fn run_loaded(scenario: &Scenario) -> anyhow::Result<ScenarioOutcome> {
    info!("Running Scenario: {}", scenario.name);
    if !scenario.description.is_empty() {
        info!("Description: {}", scenario.description);
    }

    let mut config = SimConfig::default();
    scenario.config.apply_to(&mut config);

    let outcome = match &scenario.sweep {
        Some(spec) => {
            let points = run_sweep(&config, spec).context("Sweep failed")?;
            for point in &points {
                let observed = Observed {
                    mean_occupancy: point.mean_occupancy,
                    arrival_rate: point.arrival_rate,
                    confidence_interval: point.confidence_interval,
                    queue_means: None,
                };
                check_assertions(&observed, &scenario.assertions)
                    .with_context(|| format!("at arrival probability {}", point.arrival_prob))?;
            }
            ScenarioOutcome::Sweep { points }
        }
        None => {
            let report = Simulator::new(config)?
                .run_until_complete()
                .context("Simulation failed")?;
            let queue_means = report.queue_means();
            let observed = Observed {
                mean_occupancy: report.mean_occupancy,
                arrival_rate: report.arrival_rate,
                confidence_interval: report.confidence_interval,
                queue_means: Some(&queue_means),
            };
            check_assertions(&observed, &scenario.assertions)?;
            ScenarioOutcome::Single { report }
        }
    };

    info!("Scenario Passed!");
    Ok(outcome)
}

/// Figures the assertions are checked against.
struct Observed<'a> {
    mean_occupancy: f64,
    arrival_rate: f64,
    confidence_interval: Option<f64>,
    queue_means: Option<&'a [f64]>,
}

fn check_range(what: &str, value: f64, min: Option<f64>, max: Option<f64>) -> anyhow::Result<()> {
    if let Some(min) = min
        && value < min
    {
        bail!("Assertion Failed: {what} {value} below expected min {min}");
    }
    if let Some(max) = max
        && value > max
    {
        bail!("Assertion Failed: {what} {value} above expected max {max}");
    }
    Ok(())
}

fn check_assertions(observed: &Observed<'_>, assertions: &[RunAssertion]) -> anyhow::Result<()> {
    for assertion in assertions {
        match assertion {
            RunAssertion::MeanOccupancy { min, max } => {
                check_range("mean occupancy", observed.mean_occupancy, Some(*min), *max)?;
            }
            RunAssertion::ArrivalRate { min, max } => {
                check_range("arrival rate", observed.arrival_rate, Some(*min), *max)?;
            }
            RunAssertion::ConfidenceIntervalMax { max } => {
                let ci = observed.confidence_interval.ok_or_else(|| {
                    anyhow!("Assertion Failed: no confidence interval (fewer than two queues)")
                })?;
                check_range("confidence interval", ci, None, Some(*max))?;
            }
            RunAssertion::QueueOccupancy { queue, min, max } => {
                let means = observed
                    .queue_means
                    .context("Queue occupancy assertions need a single run, not a sweep")?;
                let mean = queue
                    .checked_sub(1)
                    .and_then(|i| means.get(i))
                    .with_context(|| format!("Assertion refers to unknown queue {queue}"))?;
                check_range(&format!("queue {queue} occupancy"), *mean, *min, *max)?;
            }
        }
    }
    Ok(())
}
