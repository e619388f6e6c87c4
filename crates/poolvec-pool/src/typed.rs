//! Typed facade over a pool: element-count allocation plus explicit
//! construct/destroy.

use std::alloc::Layout;
use std::marker::PhantomData;
use std::mem;
use std::ptr::{self, NonNull};

use crate::error::PoolError;
use crate::handle::PoolHandle;

/// Allocates storage for `T`s from a borrowed pool. Holds no state of its
/// own; creating one per call is free.
pub struct TypedAllocator<'a, T> {
    pool: &'a PoolHandle,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T> TypedAllocator<'a, T> {
    pub fn new(pool: &'a PoolHandle) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }

    pub fn pool(&self) -> &'a PoolHandle {
        self.pool
    }

    /// Storage for one `T`.
    pub fn allocate_one(&self) -> Result<NonNull<T>, PoolError> {
        self.allocate(1)
    }

    /// Uninitialized storage for `n` values of `T`.
    ///
    /// Zero bytes (`n == 0` or a zero-sized `T`) yields a dangling sentinel
    /// without touching the pool.
    pub fn allocate(&self, n: usize) -> Result<NonNull<T>, PoolError> {
        let layout = Self::array_layout(n)?;
        if layout.size() == 0 {
            return Ok(NonNull::dangling());
        }
        self.pool.allocate_layout(layout).map(NonNull::cast)
    }

    /// # Safety
    ///
    /// `ptr` must come from [`Self::allocate`] on the same pool with the
    /// same `n`. Any live values must already have been destroyed.
    pub unsafe fn deallocate(&self, ptr: NonNull<T>, n: usize) {
        // `allocate` already proved this layout fits.
        let Ok(layout) = Self::array_layout(n) else {
            return;
        };
        if layout.size() == 0 {
            return;
        }
        // SAFETY: forwarded caller contract.
        unsafe { self.pool.deallocate_layout(ptr.cast(), layout) };
    }

    /// # Safety
    ///
    /// `ptr` must come from [`Self::allocate_one`] on the same pool.
    pub unsafe fn deallocate_one(&self, ptr: NonNull<T>) {
        // SAFETY: forwarded caller contract.
        unsafe { self.deallocate(ptr, 1) };
    }

    fn array_layout(n: usize) -> Result<Layout, PoolError> {
        Layout::array::<T>(n).map_err(|_| PoolError::LayoutOverflow {
            count: n,
            elem_size: mem::size_of::<T>(),
        })
    }

    /// Writes `value` into uninitialized storage.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for writes and properly aligned. Any previous
    /// value at `ptr` is overwritten without being dropped.
    pub unsafe fn construct(ptr: NonNull<T>, value: T) {
        // SAFETY: upheld by the caller.
        unsafe { ptr.write(value) };
    }

    /// Constructs in place from an arbitrary constructor. If `f` panics,
    /// nothing is written.
    ///
    /// # Safety
    ///
    /// Same as [`Self::construct`].
    pub unsafe fn construct_with(ptr: NonNull<T>, f: impl FnOnce() -> T) {
        let value = f();
        // SAFETY: upheld by the caller.
        unsafe { ptr.write(value) };
    }

    /// # Safety
    ///
    /// Same as [`Self::construct`].
    pub unsafe fn construct_default(ptr: NonNull<T>)
    where
        T: Default,
    {
        // SAFETY: upheld by the caller.
        unsafe { ptr.write(T::default()) };
    }

    /// Runs `T`'s destructor in place.
    ///
    /// # Safety
    ///
    /// `ptr` must point to a live `T` that is not used afterwards.
    pub unsafe fn destroy(ptr: NonNull<T>) {
        // SAFETY: upheld by the caller.
        unsafe { ptr::drop_in_place(ptr.as_ptr()) };
    }

    /// Destroys `len` consecutive values. A no-op for types without drop
    /// glue or when `len == 0`.
    ///
    /// # Safety
    ///
    /// `[first, first + len)` must hold live values not used afterwards.
    pub unsafe fn destroy_range(first: NonNull<T>, len: usize) {
        if !mem::needs_drop::<T>() || len == 0 {
            return;
        }
        // SAFETY: upheld by the caller.
        unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(first.as_ptr(), len)) };
    }
}

impl<T> Clone for TypedAllocator<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TypedAllocator<'_, T> {}

impl<T> std::fmt::Debug for TypedAllocator<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedAllocator")
            .field("elem", &std::any::type_name::<T>())
            .field("elem_size", &mem::size_of::<T>())
            .finish()
    }
}
