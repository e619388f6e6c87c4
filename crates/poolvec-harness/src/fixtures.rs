//! Operation scripts: loading, saving, and deterministic generation.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::HarnessError;

pub const SCRIPT_VERSION: &str = "v1";

/// One array operation. Indices refer to the array as it is when the op
/// runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    Push { value: i64 },
    Pop,
    Insert { index: usize, value: i64 },
    InsertN { index: usize, count: usize, value: i64 },
    Erase { start: usize, end: usize },
    EraseAt { index: usize },
    Reserve { capacity: usize },
    Resize { len: usize, value: i64 },
    Clear,
    ShrinkToFit,
    Assign { count: usize, value: i64 },
}

impl Op {
    /// Short label used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Push { .. } => "push",
            Self::Pop => "pop",
            Self::Insert { .. } => "insert",
            Self::InsertN { .. } => "insert_n",
            Self::Erase { .. } => "erase",
            Self::EraseAt { .. } => "erase_at",
            Self::Reserve { .. } => "reserve",
            Self::Resize { .. } => "resize",
            Self::Clear => "clear",
            Self::ShrinkToFit => "shrink_to_fit",
            Self::Assign { .. } => "assign",
        }
    }
}

/// A named sequence of ops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpScript {
    /// Schema version.
    pub version: String,
    pub name: String,
    /// Generator seed, if the script was generated.
    #[serde(default)]
    pub seed: Option<u64>,
    pub ops: Vec<Op>,
}

impl OpScript {
    pub fn new(name: impl Into<String>, ops: Vec<Op>) -> Self {
        Self {
            version: SCRIPT_VERSION.to_string(),
            name: name.into(),
            seed: None,
            ops,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_file(path: &Path) -> Result<Self, HarnessError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }

    pub fn write_file(&self, path: &Path) -> Result<(), HarnessError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Generates `steps` ops that are valid when replayed in order.
    pub fn generate(seed: u64, steps: usize) -> Self {
        let mut rng = XorShift64::new(seed);
        let mut len = 0_usize;
        let mut ops = Vec::with_capacity(steps);

        for _ in 0..steps {
            let value = rng.next_u64() as i64 % 1_000;
            let op = match rng.gen_range_usize(0, 15) {
                0..=4 => Op::Push { value },
                5 if len > 0 => Op::Pop,
                6 => Op::Insert {
                    index: rng.gen_range_usize(0, len),
                    value,
                },
                7 => Op::InsertN {
                    index: rng.gen_range_usize(0, len),
                    count: rng.gen_range_usize(0, 16),
                    value,
                },
                8 if len > 0 => {
                    let start = rng.gen_range_usize(0, len - 1);
                    let end = rng.gen_range_usize(start, len);
                    Op::Erase { start, end }
                }
                9 if len > 0 => Op::EraseAt {
                    index: rng.gen_range_usize(0, len - 1),
                },
                10 => Op::Reserve {
                    capacity: rng.gen_range_usize(0, 256),
                },
                11 => Op::Resize {
                    len: rng.gen_range_usize(0, 128),
                    value,
                },
                12 if rng.gen_range_usize(0, 9) == 0 => Op::Clear,
                13 => Op::ShrinkToFit,
                14 => Op::Assign {
                    count: rng.gen_range_usize(0, 48),
                    value,
                },
                _ => Op::Push { value },
            };
            len = len_after(&op, len);
            ops.push(op);
        }

        Self {
            seed: Some(seed),
            ..Self::new(format!("generated-{seed:#x}-{steps}"), ops)
        }
    }
}

/// Array length after `op` runs on an array of length `len`.
pub(crate) fn len_after(op: &Op, len: usize) -> usize {
    match *op {
        Op::Push { .. } | Op::Insert { .. } => len + 1,
        Op::Pop | Op::EraseAt { .. } => len.saturating_sub(1),
        Op::InsertN { count, .. } => len + count,
        Op::Erase { start, end } => len - (end - start),
        Op::Reserve { .. } | Op::ShrinkToFit => len,
        Op::Resize { len: new_len, .. } => new_len,
        Op::Clear => 0,
        Op::Assign { count, .. } => count,
    }
}

#[derive(Clone, Copy, Debug)]
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        // xorshift has a fixed point at zero.
        Self {
            state: if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed },
        }
    }

    fn next_u64(&mut self) -> u64 {
        // xorshift64*
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    fn gen_range_usize(&mut self, low: usize, high_inclusive: usize) -> usize {
        let span = high_inclusive - low + 1;
        low + (self.next_u64() as usize % span)
    }
}
