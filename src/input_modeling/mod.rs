//! The input modeling module provides a foundation for configurable entity
//! behaviors, whether that is deterministic or stochastic.  The module
//! includes the duration distributions used by sources, routers and
//! servers, the discrete choices used for kind assignment and repeats, and
//! the seedable random number generator shared by a network.

pub mod random_variable;
pub mod uniform_rng;

pub use random_variable::Boolean as BooleanRandomVariable;
pub use random_variable::Distribution;
pub use random_variable::Index as IndexRandomVariable;
pub use uniform_rng::UniformRNG;
