//! Shared, lock-protected access to a [`FixedSizePool`].
//!
//! The pool itself is unsynchronized. Containers hold a [`PoolHandle`],
//! which serializes every pool call behind a `parking_lot` mutex so that
//! arrays on different threads can draw from one pool.

use std::alloc::Layout;
use std::ptr::NonNull;
use std::sync::{Arc, LazyLock};

use parking_lot::Mutex;

use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::pool::{FixedSizePool, PoolStats};

/// Process-wide pool, built on first use from the environment and never
/// torn down.
static GLOBAL_POOL: LazyLock<PoolHandle> = LazyLock::new(|| {
    let pool = FixedSizePool::new(PoolConfig::from_env()).unwrap_or_default();
    PoolHandle::from_pool(pool)
});

/// Cloneable shared ownership of a pool.
#[derive(Clone)]
pub struct PoolHandle {
    inner: Arc<Mutex<FixedSizePool>>,
}

impl PoolHandle {
    /// A fresh, private pool.
    pub fn new(config: PoolConfig) -> Result<Self, PoolError> {
        FixedSizePool::new(config).map(Self::from_pool)
    }

    pub fn from_pool(pool: FixedSizePool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(pool)),
        }
    }

    /// The process-wide pool.
    pub fn global() -> Self {
        GLOBAL_POOL.clone()
    }

    pub fn allocate(&self, n: usize) -> Result<NonNull<u8>, PoolError> {
        self.inner.lock().allocate(n)
    }

    /// # Safety
    ///
    /// See [`FixedSizePool::deallocate`].
    pub unsafe fn deallocate(&self, ptr: NonNull<u8>, n: usize) {
        // SAFETY: forwarded caller contract.
        unsafe { self.inner.lock().deallocate(ptr, n) }
    }

    pub fn allocate_layout(&self, layout: Layout) -> Result<NonNull<u8>, PoolError> {
        self.inner.lock().allocate_layout(layout)
    }

    /// # Safety
    ///
    /// See [`FixedSizePool::deallocate_layout`].
    pub unsafe fn deallocate_layout(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded caller contract.
        unsafe { self.inner.lock().deallocate_layout(ptr, layout) }
    }

    pub fn stats(&self) -> PoolStats {
        self.inner.lock().stats()
    }

    /// Runs `f` with the pool locked.
    pub fn with<R>(&self, f: impl FnOnce(&mut FixedSizePool) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// True if both handles refer to the same pool.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for PoolHandle {
    fn default() -> Self {
        Self::global()
    }
}

impl std::fmt::Debug for PoolHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.inner.try_lock() {
            Some(pool) => f.debug_tuple("PoolHandle").field(&*pool).finish(),
            None => f.write_str("PoolHandle(<locked>)"),
        }
    }
}
