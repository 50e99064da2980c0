//! Random variables underpin both stochastic and deterministic entity
//! behaviors, in that deterministic operation is simply a distribution
//! without jitter.  Durations are sampled from `Distribution`, kinds are
//! chosen with `Index`, and repeats are decided with `Boolean`.

use rand::distributions::Distribution as RandDistribution;
use rand_distr::{Bernoulli, Exp, Normal, Uniform, WeightedIndex};
use serde::{Deserialize, Serialize};

use super::UniformRNG;
use crate::utils::errors::SimulationError;

/// A duration distribution, parameterized by its mean.  With a jitter of
/// zero, `Uniform` and `Normal` always produce the mean exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Distribution {
    /// Uniform over `[mean - jitter, mean + jitter]`
    Uniform { mean: f64, jitter: f64 },
    /// Normal, centered on `mean` with a standard deviation of `jitter`
    Normal { mean: f64, jitter: f64 },
    Exp { mean: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Boolean {
    Bernoulli { p: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Index {
    /// Range is inclusive of min, exclusive of max: [min, max)
    Uniform {
        min: usize,
        max: usize,
    },
    WeightedIndex {
        weights: Vec<u64>,
    },
}

impl Distribution {
    /// A fixed duration, without any jitter.
    pub fn fixed(mean: f64) -> Self {
        Distribution::Uniform { mean, jitter: 0.0 }
    }

    pub fn mean(&self) -> f64 {
        match self {
            Distribution::Uniform { mean, .. }
            | Distribution::Normal { mean, .. }
            | Distribution::Exp { mean } => *mean,
        }
    }

    fn jitter(&self) -> f64 {
        match self {
            Distribution::Uniform { jitter, .. } | Distribution::Normal { jitter, .. } => *jitter,
            Distribution::Exp { .. } => 0.0,
        }
    }

    /// Reject parameters that could never drive a terminating simulation.
    /// `entity` names the configured owner, for error reporting.
    pub fn validate(&self, entity: &str) -> Result<(), SimulationError> {
        let mean = self.mean();
        if !mean.is_finite() || mean <= 0.0 {
            return Err(SimulationError::NonPositiveMean {
                entity: entity.to_string(),
            });
        }
        let jitter = self.jitter();
        if !jitter.is_finite() || jitter < 0.0 {
            return Err(SimulationError::NegativeJitter {
                entity: entity.to_string(),
            });
        }
        // The sampling range itself must be representable
        if !(mean - jitter).is_finite() || !(mean + jitter).is_finite() {
            return Err(SimulationError::UnboundedRange {
                entity: entity.to_string(),
            });
        }
        Ok(())
    }

    /// The generation of random variates drives stochastic behaviors during
    /// simulation execution.  This function requires the random number
    /// generator of the network, and produces a raw f64 random variate,
    /// which may be zero or negative for wide normal distributions.
    pub fn random_variate(&self, uniform_rng: &mut UniformRNG) -> Result<f64, SimulationError> {
        match self {
            Distribution::Uniform { mean, jitter } | Distribution::Normal { mean, jitter }
                if *jitter == 0.0 =>
            {
                Ok(*mean)
            }
            Distribution::Uniform { mean, jitter } => {
                Ok(Uniform::new_inclusive(*mean - *jitter, *mean + *jitter)
                    .sample(uniform_rng.rng()))
            }
            Distribution::Normal { mean, jitter } => {
                Ok(Normal::new(*mean, *jitter)?.sample(uniform_rng.rng()))
            }
            Distribution::Exp { mean } => Ok(Exp::new(1.0 / *mean)?.sample(uniform_rng.rng())),
        }
    }

    /// A random variate usable as a countdown.  Variates at or below zero
    /// are clamped to a single tick, so an entity can never stall on a
    /// negative countdown.
    pub fn duration(
        &self,
        uniform_rng: &mut UniformRNG,
        tick_step: f64,
    ) -> Result<f64, SimulationError> {
        let variate = self.random_variate(uniform_rng)?;
        if variate <= 0.0 || !variate.is_finite() {
            Ok(tick_step)
        } else {
            Ok(variate)
        }
    }
}

impl Boolean {
    /// The generation of random variates drives stochastic behaviors during
    /// simulation execution.  This function requires the random number
    /// generator of the network, and produces a boolean random variate.
    pub fn random_variate(&self, uniform_rng: &mut UniformRNG) -> Result<bool, SimulationError> {
        match self {
            Boolean::Bernoulli { p } => Ok(Bernoulli::new(*p)?.sample(uniform_rng.rng())),
        }
    }
}

impl Index {
    /// Check that the choice can be sampled at all, before any tick runs.
    pub fn validate(&self) -> Result<(), SimulationError> {
        match self {
            Index::Uniform { min, max } if min >= max => Err(SimulationError::InvalidModelState),
            Index::Uniform { .. } => Ok(()),
            Index::WeightedIndex { weights } => {
                WeightedIndex::<u64>::new(weights)?;
                Ok(())
            }
        }
    }

    /// The generation of random variates drives stochastic behaviors during
    /// simulation execution.  This function requires the random number
    /// generator of the network, and produces a usize random variate.
    pub fn random_variate(&self, uniform_rng: &mut UniformRNG) -> Result<usize, SimulationError> {
        match self {
            Index::Uniform { min, max } => Ok(Uniform::new(*min, *max).sample(uniform_rng.rng())),
            Index::WeightedIndex { weights } => {
                Ok(WeightedIndex::<u64>::new(weights)?.sample(uniform_rng.rng()))
            }
        }
    }
}
