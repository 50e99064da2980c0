//! # Overview
//! "Stepsim" provides a fixed-time-step queueing network simulation
//! engine, for Rust- and npm-based simulation projects.
//!
//! This repository contains:
//!
//! * Random variable framework, for easy specification of stochastic
//! durations, kind assignment and repeats.
//! * Pre-built entities - sources, routers and single-capacity servers -
//! along with FIFO queues and unbuffered pools, for quickly building out
//! queueing networks.
//! * Output analysis framework, for summarizing independent replications
//! statistically.
//! * Simulator engine, for validating network configurations and driving
//! them tick by tick, plus an event-driven single-server model.
//!
//! Networks are described with JSON or YAML configuration, and a run
//! produces a `Metrics` record: throughput, losses, SLA misses, queue
//! high-water marks and waiting time statistics.  The engine logs through
//! `tracing`, but never installs a subscriber.
//!
//! Stepsim is compatible with a wide variety of compilation targets,
//! including WASM. Stepsim does not require nightly Rust.
pub mod input_modeling;
pub mod models;
pub mod output_analysis;
pub mod simulator;
pub mod utils;
