//! Conformance harness for poolvec.
//!
//! This crate provides:
//! - Op scripts: JSON fixtures describing array operation sequences
//! - Generation: deterministic seeded scripts that stay in bounds
//! - Replay: run a script against `DynamicArray` and a `Vec` reference
//! - Workloads: canned runs that report pool statistics and lifecycle logs

#![forbid(unsafe_code)]

pub mod error;
pub mod fixtures;
pub mod runner;
pub mod workload;

pub use error::HarnessError;
pub use fixtures::{Op, OpScript};
pub use runner::{MAX_REPLAY_LEN, ReplayReport, ScriptRunner, StepDivergence, StepRecord};
pub use workload::{StatsReport, push_workload};
