//! # poolvec-core
//!
//! Containers built on the `poolvec-pool` allocator.
//!
//! - **Element capability** (`element`): compile-time "bitwise copyable" query
//! - **Uninitialized memory ops** (`uninit`): bulk copy/fill/relocate with rollback
//! - **Dynamic array** (`array`): growable, pool-backed, commit-then-free reallocation
//! - **Fixed array** (`fixed`): inline `[T; N]` wrapper with checked access

pub mod array;
pub mod element;
pub mod error;
pub mod fixed;
pub mod uninit;

pub use array::{DynamicArray, IntoIter};
pub use element::Element;
pub use error::ArrayError;
pub use fixed::FixedArray;
pub use poolvec_pool::{PoolConfig, PoolError, PoolHandle};
