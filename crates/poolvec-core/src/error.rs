//! Container error taxonomy.

use poolvec_pool::PoolError;
use thiserror::Error;

/// Errors surfaced by checked accessors and fallible container operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArrayError {
    #[error("index {index} out of bounds for length {len}")]
    OutOfBounds { index: usize, len: usize },
    #[error("capacity overflow")]
    CapacityOverflow,
    #[error(transparent)]
    Alloc(#[from] PoolError),
}
