//! Small-object pool allocator for poolvec.
//!
//! This crate implements the storage layer the containers in `poolvec-core`
//! draw from: size-class free lists refilled from a bump arena, with a
//! bypass to the system allocator for large or over-aligned requests.
//!
//! # Architecture
//!
//! - **Size classes** (`size_class`): rounding and bucket indexing
//! - **Pool** (`pool`): free lists, refill, three-tier chunk carving, scavenging
//! - **System source** (`source`): pluggable raw memory provider with optional byte limit
//! - **Handle** (`handle`): shared, mutex-protected pool plus the process-wide instance
//! - **Typed allocator** (`typed`): element-count allocation and construct/destroy
//! - **Configuration** (`config`): defaults and environment overrides
//! - **Lifecycle log** (`log`): bounded ring of structured allocation records

pub mod config;
pub mod error;
pub mod handle;
pub mod log;
pub mod pool;
pub mod size_class;
pub mod source;
pub mod typed;

pub use config::PoolConfig;
pub use error::PoolError;
pub use handle::PoolHandle;
pub use log::{PoolLogLevel, PoolLogRecord};
pub use pool::{FixedSizePool, PoolStats};
pub use size_class::SizeClassTable;
pub use source::{HeapSource, SystemSource};
pub use typed::TypedAllocator;
