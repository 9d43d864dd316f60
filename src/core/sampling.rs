use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use super::types::Bound;

/// z-distance spanning the central 90% of a standard normal.
pub const Z_90: f64 = 3.29;

const LOW_PERCENTILE: f64 = 5.0;
const HIGH_PERCENTILE: f64 = 95.0;

/// Owns the one generator every stage draws from, so a seeded sampler
/// replays the same populations when the stages run in the same order.
pub struct Sampler {
    rng: StdRng,
    samples: usize,
}

impl Sampler {
    pub fn new(samples: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng, samples }
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Independent draws from `Normal((low + high) / 2, (high - low) / 3.29)`.
    pub fn draw(&mut self, bound: Bound) -> Vec<f64> {
        let mean = bound.midpoint();
        let std_dev = bound.width() / Z_90;
        (0..self.samples)
            .map(|_| {
                let z: f64 = self.rng.sample(StandardNormal);
                mean + std_dev * z
            })
            .collect()
    }

    // (amount + contribution) * (1 + growth), each drawn independently.
    pub fn year_value(&mut self, amount: Bound, growth: Bound, contribution: Bound) -> Vec<f64> {
        let amounts = self.draw(amount);
        let growth_rates = self.draw(growth);
        let contributions = self.draw(contribution);

        amounts
            .iter()
            .zip(&contributions)
            .zip(&growth_rates)
            .map(|((amount, contribution), growth)| {
                let x = amount + contribution;
                x + x * growth
            })
            .collect()
    }
}

pub fn collapse(values: &mut [f64]) -> Bound {
    values.sort_by(|a, b| a.total_cmp(b));
    Bound::new(
        percentile_sorted(values, LOW_PERCENTILE),
        percentile_sorted(values, HIGH_PERCENTILE),
    )
}

fn percentile_sorted(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let n = values.len();
    if n == 1 {
        return values[0];
    }

    let rank = (p / 100.0) * (n as f64 - 1.0);
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;

    if lower == upper {
        values[lower]
    } else {
        let w = rank - lower as f64;
        values[lower] * (1.0 - w) + values[upper] * w
    }
}
