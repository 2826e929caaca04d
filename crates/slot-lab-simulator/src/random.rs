use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use slot_lab_abstract::CorrelationBounds;

/// Draws from the correlated stream are folded into `[0, 0.65)` before the
/// Bernoulli comparison.
pub const CORRELATED_FOLD: f64 = 0.65;

/// Uniform values on `[0, 1)` where each value is the previous one moved by a
/// bounded random step, wrapped modulo 1.
#[derive(Debug, Clone)]
pub struct CorrelatedSource {
    current: f64,
    bounds: CorrelationBounds,
    rng: StdRng,
}

impl CorrelatedSource {
    pub fn new(bounds: CorrelationBounds, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let current = rng.random::<f64>();
        Self {
            current,
            bounds,
            rng,
        }
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    fn perturbation(&mut self) -> f64 {
        let lower = self.bounds.lower();
        let upper = self.bounds.upper();
        lower + self.rng.random::<f64>() * (upper - lower)
    }

    /// `(current + |step|) mod 1`: always walks forward around the unit circle.
    pub fn next_uniform(&mut self) -> f64 {
        let step = self.perturbation().abs();
        self.current = (self.current + step) % 1.0;
        self.current
    }

    /// `|current + step| mod 1`: negative excursions reflect at zero.
    pub fn next_uniform_correlated(&mut self) -> f64 {
        let step = self.perturbation();
        self.current = (self.current + step).abs() % 1.0;
        self.current
    }

    pub fn next_bernoulli(&mut self, p: f64) -> bool {
        self.next_uniform() <= p
    }

    pub fn next_bernoulli_correlated(&mut self, p: f64) -> bool {
        self.next_uniform_correlated() % CORRELATED_FOLD <= p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(a: f64, b: f64) -> CorrelatedSource {
        CorrelatedSource::new(CorrelationBounds::new(a, b), 7)
    }

    #[test]
    fn values_stay_in_unit_interval() {
        let mut src = source(0.5, 0.5);
        for _ in 0..10_000 {
            let u = src.next_uniform();
            assert!((0.0..1.0).contains(&u), "next_uniform out of range: {u}");
            let c = src.next_uniform_correlated();
            assert!((0.0..1.0).contains(&c), "correlated out of range: {c}");
        }
    }

    #[test]
    fn steps_are_bounded_by_correlation() {
        let mut src = source(0.1, 0.1);
        let mut prev = src.current();
        for _ in 0..1_000 {
            let next = src.next_uniform();
            // forward distance around the unit circle
            let moved = (next - prev).rem_euclid(1.0);
            assert!(moved <= 0.1 + 1e-12, "moved {moved}");
            prev = next;
        }
    }

    #[test]
    fn zero_width_range_keeps_value_fixed() {
        let mut src = source(0.0, 0.0);
        let start = src.current();
        assert_eq!(src.next_uniform(), start);
        assert_eq!(src.next_uniform_correlated(), start);
    }

    #[test]
    fn certain_probabilities_always_succeed() {
        let mut src = source(0.5, 0.5);
        for _ in 0..1_000 {
            assert!(src.next_bernoulli(1.0));
            assert!(src.next_bernoulli_correlated(CORRELATED_FOLD));
        }
    }

    #[test]
    fn same_seed_same_stream() {
        let mut a = source(0.3, 0.2);
        let mut b = source(0.3, 0.2);
        for _ in 0..100 {
            assert_eq!(a.next_uniform_correlated(), b.next_uniform_correlated());
            assert_eq!(a.next_bernoulli(0.4), b.next_bernoulli(0.4));
        }
    }
}
