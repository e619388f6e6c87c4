//! Harness error taxonomy.

use poolvec_core::ArrayError;
use poolvec_pool::PoolError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("pool: {0}")]
    Pool(#[from] PoolError),
    #[error("array: {0}")]
    Array(#[from] ArrayError),
    #[error("step {step}: invalid op: {reason}")]
    InvalidOp { step: usize, reason: String },
    #[error("step {step}: array diverged from reference: {reason}")]
    Divergence { step: usize, reason: String },
}
