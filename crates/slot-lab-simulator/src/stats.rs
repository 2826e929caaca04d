use crate::error::SimError;
use crate::queue::SimQueue;

/// Mean occupancy of every queue over `slots`.
pub fn average_occupancies(queues: &[SimQueue], slots: u64) -> Result<Vec<f64>, SimError> {
    queues.iter().map(|q| q.average_occupancy(slots)).collect()
}

pub fn mean(values: &[f64]) -> Result<f64, SimError> {
    if values.is_empty() {
        return Err(SimError::TooFewSamples { needed: 1, have: 0 });
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation of `values` around `mean` (divisor `n - 1`).
pub fn confidence_interval(values: &[f64], mean: f64) -> Result<f64, SimError> {
    if values.len() < 2 {
        return Err(SimError::TooFewSamples {
            needed: 2,
            have: values.len(),
        });
    }
    let squares: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    Ok((squares / (values.len() - 1) as f64).sqrt())
}

/// `numerator / denominator`, or zero when nothing was counted.
pub fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
