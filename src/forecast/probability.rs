use crate::models::CandidateAggregate;
use rand::Rng;
use std::collections::BTreeMap;

pub const DEFAULT_ITERATIONS: u32 = 1_000_000;

/// Probabilities at or below this share are not worth showing.
pub const DISPLAY_FLOOR_PCT: f64 = 0.5;

/// Source of the random offset added to a candidate's share in each trial.
pub trait NoiseSource {
    fn sample(&mut self) -> f64;
}

impl<F> NoiseSource for F
where
    F: FnMut() -> f64,
{
    fn sample(&mut self) -> f64 {
        self()
    }
}

/// Uniform offsets drawn from `[low, high)`.
#[derive(Debug, Clone)]
pub struct UniformNoise<R> {
    rng: R,
    low: f64,
    high: f64,
}

impl<R: Rng> UniformNoise<R> {
    pub fn new(rng: R, low: f64, high: f64) -> Self {
        Self { rng, low, high }
    }

    /// `(u - 0.9) * 40` for `u` uniform in `[0, 1)`: a wide band skewed
    /// toward negative offsets.
    pub fn reference(rng: R) -> Self {
        Self::new(rng, -36.0, 4.0)
    }

    pub fn symmetric(rng: R, spread: f64) -> Self {
        Self::new(rng, -spread, spread)
    }
}

impl<R: Rng> NoiseSource for UniformNoise<R> {
    fn sample(&mut self) -> f64 {
        if self.high > self.low {
            self.rng.gen_range(self.low..self.high)
        } else {
            self.low
        }
    }
}

/// Monte Carlo estimate of each candidate's chance of finishing first, in
/// percent. Ties within a trial go to the earlier candidate.
pub fn estimate_win_probabilities<N>(
    aggregates: &[CandidateAggregate],
    iterations: u32,
    noise: &mut N,
) -> BTreeMap<String, f64>
where
    N: NoiseSource + ?Sized,
{
    if aggregates.is_empty() || iterations == 0 {
        return BTreeMap::new();
    }

    let mut wins = vec![0u64; aggregates.len()];
    for _ in 0..iterations {
        let mut best_index = 0;
        let mut best_value = f64::NEG_INFINITY;
        for (index, candidate) in aggregates.iter().enumerate() {
            let value = candidate.percentage + noise.sample();
            if value > best_value {
                best_value = value;
                best_index = index;
            }
        }
        wins[best_index] += 1;
    }

    let mut probabilities = BTreeMap::new();
    for (candidate, won) in aggregates.iter().zip(wins) {
        *probabilities.entry(candidate.name.clone()).or_insert(0.0) +=
            won as f64 / f64::from(iterations) * 100.0;
    }
    probabilities
}

pub fn displayed_probabilities(probabilities: &BTreeMap<String, f64>, floor_pct: f64) -> Vec<(&str, f64)> {
    probabilities
        .iter()
        .filter(|(_, probability)| **probability > floor_pct)
        .map(|(name, probability)| (name.as_str(), *probability))
        .collect()
}
