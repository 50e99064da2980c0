use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;
use serde::{Deserialize, Serialize};

/// The seed used when a network configuration does not provide one.
pub const DEFAULT_SEED: u64 = 42;

/// The single random number generator of a network.  Every draw in a run
/// (durations, kind choices, repeats) comes from this stream, so a fixed
/// seed and a fixed configuration replay the same run exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniformRNG {
    rng: Pcg64Mcg,
}

impl Default for UniformRNG {
    fn default() -> Self {
        Self::from_seed(DEFAULT_SEED)
    }
}

impl UniformRNG {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    pub fn rng(&mut self) -> &mut Pcg64Mcg {
        &mut self.rng
    }
}
