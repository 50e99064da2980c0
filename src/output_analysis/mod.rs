//! The output analysis module provides standard statistical analysis tools
//! for analyzing simulation outputs.  Replications of a network run are
//! independent, identically-distributed (IID) by construction, so any
//! per-run statistic - processed count, loss probability, mean waiting time
//! - can be summarized with the `IndependentSample`.

use num_traits::Float;
use serde::{Deserialize, Serialize};

use crate::utils::errors::SimulationError;

fn sum<T: Float>(points: &[T]) -> T {
    points.iter().fold(T::zero(), |sum, point| sum + *point)
}

/// This function calculates the sample mean from a set of points - a simple
/// arithmetic mean.
fn sample_mean<T: Float>(points: &[T]) -> Result<T, SimulationError> {
    Ok(sum(points) / usize_to_float(points.len())?)
}

/// This function calculates the unbiased sample variance, given a set of
/// points and the sample mean.  A single point has a variance of zero.
fn sample_variance<T: Float>(points: &[T], mean: &T) -> Result<T, SimulationError> {
    if points.len() < 2 {
        return Ok(T::zero());
    }
    Ok(points
        .iter()
        .fold(T::zero(), |acc, point| acc + (*point - *mean).powi(2))
        / usize_to_float(points.len() - 1)?)
}

/// This function converts a usize to a Float, with an associated
/// `SimulationError` returned for failed conversions
fn usize_to_float<T: Float>(unconv: usize) -> Result<T, SimulationError> {
    T::from(unconv).ok_or(SimulationError::FloatConvError)
}

/// The independent sample is for independent, identically-distributed (IID)
/// samples, or where treating the data as an IID sample is determined to be
/// reasonable.  Typically, this will be one statistic per replication.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct IndependentSample<T> {
    points: Vec<T>,
    mean: T,
    variance: T,
}

impl<T: Float> IndependentSample<T> {
    /// This constructor method creates an `IndependentSample` from a vector
    /// of floating point values.  At least one point is required.
    pub fn post(points: Vec<T>) -> Result<IndependentSample<T>, SimulationError> {
        if points.is_empty() {
            return Err(SimulationError::EmptySample);
        }
        let mean = sample_mean(&points)?;
        let variance = sample_variance(&points, &mean)?;
        Ok(IndependentSample {
            points,
            mean,
            variance,
        })
    }

    /// Return the sample mean.
    pub fn point_estimate_mean(&self) -> T {
        self.mean
    }

    /// Return the sample variance.
    pub fn variance(&self) -> T {
        self.variance
    }

    /// Return the standard error of the sample mean.
    pub fn standard_error(&self) -> Result<T, SimulationError> {
        let points_len: T = usize_to_float(self.points.len())?;
        Ok((self.variance / points_len).sqrt())
    }

    pub fn min(&self) -> T {
        self.points.iter().fold(T::infinity(), |min, point| min.min(*point))
    }

    pub fn max(&self) -> T {
        self.points
            .iter()
            .fold(T::neg_infinity(), |max, point| max.max(*point))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
