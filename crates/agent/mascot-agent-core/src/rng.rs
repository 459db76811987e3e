//! Random source seam for branch selection and idle picks.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Uniform draws consumed by the core. Injectable so weighted branching and
/// idle selection are deterministic under test.
pub trait RandomSource {
    /// Uniform draw in `[0, 100)`.
    fn percent(&mut self) -> f32;

    /// Uniform index in `[0, len)`. `len` must be non-zero.
    fn index(&mut self, len: usize) -> usize;
}

/// Default source backed by a small PRNG.
#[derive(Debug)]
pub struct EntropyRandom(SmallRng);

impl EntropyRandom {
    pub fn new() -> Self {
        Self(SmallRng::from_entropy())
    }

    /// Reproducible source for tests and replays.
    pub fn seeded(seed: u64) -> Self {
        Self(SmallRng::seed_from_u64(seed))
    }
}

impl Default for EntropyRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for EntropyRandom {
    fn percent(&mut self) -> f32 {
        self.0.gen_range(0.0..100.0)
    }

    fn index(&mut self, len: usize) -> usize {
        self.0.gen_range(0..len)
    }
}
