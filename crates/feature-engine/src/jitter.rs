//! Injectable noise source for synthetic hydraulics features

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Source of bounded uniform noise
pub trait Jitter: Send {
    /// Draw from `[low, high)`
    fn uniform(&mut self, low: f64, high: f64) -> f64;
}

/// Pseudo-random noise, optionally seeded for reproducibility
pub struct RandomJitter {
    rng: StdRng,
}

impl RandomJitter {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl Jitter for RandomJitter {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if low >= high {
            return low;
        }
        self.rng.gen_range(low..high)
    }
}

/// Noise disabled: every draw returns the midpoint of its range
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl Jitter for NoJitter {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        (low + high) / 2.0
    }
}

/// Configured noise behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseMode {
    /// Random draws (seeded when a seed is given)
    #[default]
    Random,
    /// Deterministic midpoints
    Off,
}

impl NoiseMode {
    /// Build the jitter source for this mode
    pub fn into_jitter(self, seed: Option<u64>) -> Box<dyn Jitter> {
        match (self, seed) {
            (NoiseMode::Off, _) => {
                info!("Hydraulics noise disabled");
                Box::new(NoJitter)
            }
            (NoiseMode::Random, Some(seed)) => {
                info!("Hydraulics noise seeded with {}", seed);
                Box::new(RandomJitter::seeded(seed))
            }
            (NoiseMode::Random, None) => Box::new(RandomJitter::from_entropy()),
        }
    }
}
