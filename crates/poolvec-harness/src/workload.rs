//! Canned workloads that report pool behavior.

use poolvec_core::DynamicArray;
use poolvec_pool::{PoolConfig, PoolHandle, PoolLogRecord, PoolStats};
use serde::Serialize;

use crate::error::HarnessError;

/// Pool state after a push workload.
#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub pushes: usize,
    /// Capacity after each reallocation, in order.
    pub capacity_steps: Vec<usize>,
    pub stats: PoolStats,
    pub log: Vec<PoolLogRecord>,
}

impl StatsReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Pushes `pushes` values into a fresh array on a fresh pool, then drops
/// the array and snapshots the pool.
pub fn push_workload(config: PoolConfig, pushes: usize) -> Result<StatsReport, HarnessError> {
    let pool = PoolHandle::new(config)?;
    let mut array: DynamicArray<u64> = DynamicArray::new_in(pool.clone());
    let mut capacity_steps = Vec::new();

    for i in 0..pushes {
        array.try_push(i as u64)?;
        if capacity_steps.last() != Some(&array.capacity()) {
            capacity_steps.push(array.capacity());
        }
    }
    drop(array);

    let (stats, log) = pool.with(|p| (p.stats(), p.drain_logs()));
    Ok(StatsReport {
        pushes,
        capacity_steps,
        stats,
        log,
    })
}
