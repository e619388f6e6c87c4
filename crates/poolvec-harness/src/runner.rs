//! Script replay engine.
//!
//! Every op is applied to a pool-backed `DynamicArray<i64>` and to a plain
//! `Vec<i64>` reference. After each step the runner checks that contents
//! match, that `len <= capacity`, and that `reserve` never lowers capacity.

use poolvec_core::DynamicArray;
use poolvec_pool::{PoolConfig, PoolHandle, PoolStats};
use serde::Serialize;

use crate::error::HarnessError;
use crate::fixtures::{Op, OpScript};

/// Largest length or capacity a script may ask for.
pub const MAX_REPLAY_LEN: usize = 1 << 24;

/// Array state after one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub step: usize,
    pub op: &'static str,
    pub len: usize,
    pub capacity: usize,
}

/// First point where the array and the reference disagreed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepDivergence {
    pub step: usize,
    pub op: &'static str,
    pub reason: String,
}

/// Outcome of replaying one script.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub script: String,
    pub seed: Option<u64>,
    /// Steps executed (stops at the first divergence).
    pub steps_run: usize,
    pub passed: bool,
    pub divergence: Option<StepDivergence>,
    pub final_len: usize,
    pub final_capacity: usize,
    pub peak_capacity: usize,
    pub trace: Vec<StepRecord>,
    pub pool: PoolStats,
}

impl ReplayReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Converts a failed report into [`HarnessError::Divergence`].
    pub fn into_result(self) -> Result<Self, HarnessError> {
        match &self.divergence {
            Some(divergence) => Err(HarnessError::Divergence {
                step: divergence.step,
                reason: divergence.reason.clone(),
            }),
            None => Ok(self),
        }
    }
}

/// Replays scripts, each on a fresh pool.
#[derive(Debug, Clone, Default)]
pub struct ScriptRunner {
    pub config: PoolConfig,
}

impl ScriptRunner {
    #[must_use]
    pub fn new(config: PoolConfig) -> Self {
        Self { config }
    }

    /// Runs `script`. Ops that are invalid for the current length return
    /// [`HarnessError::InvalidOp`]; mismatches are reported in the
    /// returned [`ReplayReport`].
    pub fn run(&self, script: &OpScript) -> Result<ReplayReport, HarnessError> {
        let pool = PoolHandle::new(self.config.clone())?;
        let mut array: DynamicArray<i64> = DynamicArray::new_in(pool.clone());
        let mut reference: Vec<i64> = Vec::new();
        let mut trace = Vec::with_capacity(script.ops.len());
        let mut divergence = None;
        let mut peak_capacity = 0;

        for (step, op) in script.ops.iter().enumerate() {
            validate(op, reference.len()).map_err(|reason| HarnessError::InvalidOp { step, reason })?;
            let before = array.capacity();
            apply(&mut array, &mut reference, op)?;

            peak_capacity = peak_capacity.max(array.capacity());
            trace.push(StepRecord {
                step,
                op: op.kind(),
                len: array.len(),
                capacity: array.capacity(),
            });

            if let Some(reason) = check(&array, &reference, op, before) {
                divergence = Some(StepDivergence {
                    step,
                    op: op.kind(),
                    reason,
                });
                break;
            }
        }

        let steps_run = trace.len();
        let final_len = array.len();
        let final_capacity = array.capacity();
        drop(array);

        Ok(ReplayReport {
            script: script.name.clone(),
            seed: script.seed,
            steps_run,
            passed: divergence.is_none(),
            divergence,
            final_len,
            final_capacity,
            peak_capacity,
            trace,
            pool: pool.stats(),
        })
    }
}

fn validate(op: &Op, len: usize) -> Result<(), String> {
    let requested = match *op {
        Op::InsertN { count, .. } => len.saturating_add(count),
        Op::Reserve { capacity } => capacity,
        Op::Resize { len, .. } => len,
        Op::Assign { count, .. } => count,
        _ => 0,
    };
    if requested > MAX_REPLAY_LEN {
        return Err(format!("{} asks for {requested} slots (limit {MAX_REPLAY_LEN})", op.kind()));
    }
    match *op {
        Op::Insert { index, .. } | Op::InsertN { index, .. } if index > len => {
            Err(format!("insert index {index} > len {len}"))
        }
        Op::EraseAt { index } if index >= len => Err(format!("erase index {index} >= len {len}")),
        Op::Erase { start, end } if start > end || end > len => {
            Err(format!("erase range {start}..{end} out of bounds for len {len}"))
        }
        _ => Ok(()),
    }
}

/// Grows the array through the fallible path first so pool exhaustion
/// surfaces as an error instead of a panic.
fn apply(
    array: &mut DynamicArray<i64>,
    reference: &mut Vec<i64>,
    op: &Op,
) -> Result<(), HarnessError> {
    match *op {
        Op::Push { value } => {
            array.push_back(value);
            reference.push(value);
        }
        Op::Pop => {
            array.pop_back();
            reference.pop();
        }
        Op::Insert { index, value } => {
            array.insert(index, value);
            reference.insert(index, value);
        }
        Op::InsertN {
            index,
            count,
            value,
        } => {
            array.insert_n(index, count, &value);
            reference.splice(index..index, std::iter::repeat_n(value, count));
        }
        Op::Erase { start, end } => {
            array.erase(start..end);
            reference.drain(start..end);
        }
        Op::EraseAt { index } => {
            array.erase_at(index);
            reference.remove(index);
        }
        Op::Reserve { capacity } => {
            array.try_reserve(capacity)?;
        }
        Op::Resize { len, value } => {
            array.resize(len, value);
            reference.resize(len, value);
        }
        Op::Clear => {
            array.clear();
            reference.clear();
        }
        Op::ShrinkToFit => {
            array.shrink_to_fit();
        }
        Op::Assign { count, value } => {
            array.assign(count, &value);
            reference.clear();
            reference.resize(count, value);
        }
    }
    Ok(())
}

fn check(array: &DynamicArray<i64>, reference: &[i64], op: &Op, before: usize) -> Option<String> {
    if array.len() > array.capacity() {
        return Some(format!(
            "len {} exceeds capacity {}",
            array.len(),
            array.capacity()
        ));
    }
    if array.as_slice() != reference {
        let at = array
            .iter()
            .zip(reference)
            .position(|(a, b)| a != b)
            .unwrap_or(array.len().min(reference.len()));
        return Some(format!(
            "contents differ at index {at} (len {} vs reference {})",
            array.len(),
            reference.len()
        ));
    }
    match *op {
        Op::Reserve { capacity } if array.capacity() < capacity.max(before) => Some(format!(
            "reserve({capacity}) left capacity {} (was {before})",
            array.capacity()
        )),
        Op::ShrinkToFit if array.capacity() != array.len() => Some(format!(
            "shrink_to_fit left capacity {} for len {}",
            array.capacity(),
            array.len()
        )),
        Op::Assign { count, .. } if array.capacity() < before.max(count) => Some(format!(
            "assign({count}) shrank capacity from {before} to {}",
            array.capacity()
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_script_passes() {
        let script = OpScript::new(
            "basic",
            vec![
                Op::Push { value: 1 },
                Op::Push { value: 2 },
                Op::Insert { index: 1, value: 9 },
                Op::Reserve { capacity: 10 },
                Op::Reserve { capacity: 5 },
                Op::EraseAt { index: 0 },
            ],
        );
        let report = ScriptRunner::default().run(&script).unwrap();
        assert!(report.passed);
        assert_eq!(report.steps_run, 6);
        assert_eq!(report.final_len, 2);
        assert_eq!(report.final_capacity, 10);
        assert_eq!(report.trace[3].capacity, 10);
        assert_eq!(report.trace[4].capacity, 10);
    }

    #[test]
    fn invalid_index_is_rejected() {
        let script = OpScript::new("bad", vec![Op::Push { value: 1 }, Op::EraseAt { index: 3 }]);
        let err = ScriptRunner::default().run(&script).unwrap_err();
        assert!(matches!(err, HarnessError::InvalidOp { step: 1, .. }));
    }

    #[test]
    fn oversized_requests_are_rejected() {
        for op in [
            Op::Reserve {
                capacity: usize::MAX,
            },
            Op::InsertN {
                index: 0,
                count: usize::MAX,
                value: 1,
            },
            Op::Resize {
                len: MAX_REPLAY_LEN + 1,
                value: 0,
            },
            Op::Assign {
                count: usize::MAX,
                value: 0,
            },
        ] {
            let script = OpScript::new("huge", vec![Op::Push { value: 1 }, op]);
            let err = ScriptRunner::default().run(&script).unwrap_err();
            assert!(matches!(err, HarnessError::InvalidOp { step: 1, .. }), "{err}");
        }
    }

    #[test]
    fn reserve_exhaustion_is_an_error() {
        let config = PoolConfig::default().with_heap_limit(0);
        let script = OpScript::new("tight", vec![Op::Reserve { capacity: 1_000 }]);
        let err = ScriptRunner::new(config).run(&script).unwrap_err();
        assert!(matches!(err, HarnessError::Array(_)), "{err}");
    }

    #[test]
    fn assign_keeps_capacity() {
        let script = OpScript::new(
            "assign",
            vec![
                Op::Assign { count: 5, value: 1 },
                Op::Assign { count: 2, value: 7 },
            ],
        );
        let report = ScriptRunner::default().run(&script).unwrap();
        assert!(report.passed);
        assert_eq!(report.final_len, 2);
        assert_eq!(report.final_capacity, 5);
    }

    #[test]
    fn divergence_converts_to_error() {
        let report = ReplayReport {
            script: "x".into(),
            seed: None,
            steps_run: 1,
            passed: false,
            divergence: Some(StepDivergence {
                step: 0,
                op: "push",
                reason: "contents differ".into(),
            }),
            final_len: 0,
            final_capacity: 0,
            peak_capacity: 0,
            trace: Vec::new(),
            pool: PoolHandle::new(PoolConfig::default()).unwrap().stats(),
        };
        assert!(matches!(
            report.into_result(),
            Err(HarnessError::Divergence { step: 0, .. })
        ));
    }
}
