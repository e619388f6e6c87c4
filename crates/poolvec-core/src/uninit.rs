//! Bulk construction into uninitialized memory.
//!
//! Every operation either initializes the whole destination or, if a
//! constructor panics (or returns `Err` for [`try_fill_with`]), drops what it
//! already built and leaves the destination uninitialized before the
//! failure propagates. Types whose [`Element::BITWISE`] is true skip the
//! per-slot loop entirely.

use std::mem::{self, MaybeUninit};
use std::ptr;
use std::slice;

use crate::element::Element;

/// Drops `[start, start + initialized)` unless disarmed with `mem::forget`.
struct InitGuard<T> {
    start: *mut T,
    initialized: usize,
}

impl<T> Drop for InitGuard<T> {
    fn drop(&mut self) {
        // SAFETY: exactly the first `initialized` slots were written.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.start, self.initialized));
        }
    }
}

/// Clones `src` into `dest` and returns `dest` as initialized.
///
/// # Panics
///
/// If the lengths differ, or if a `clone()` panics (after rollback).
pub fn copy<'a, T: Element>(src: &[T], dest: &'a mut [MaybeUninit<T>]) -> &'a mut [T] {
    assert_eq!(src.len(), dest.len(), "copy length mismatch");
    let len = src.len();
    let start = dest.as_mut_ptr().cast::<T>();

    if T::BITWISE {
        // SAFETY: bitwise elements are duplicated by byte copy; `dest` is a
        // distinct exclusive borrow, so the ranges cannot overlap.
        unsafe { ptr::copy_nonoverlapping(src.as_ptr(), start, len) };
    } else {
        let mut guard = InitGuard {
            start,
            initialized: 0,
        };
        for item in src {
            // SAFETY: slot `initialized` lies within `dest`.
            unsafe { start.add(guard.initialized).write(item.clone()) };
            guard.initialized += 1;
        }
        mem::forget(guard);
    }

    // SAFETY: all `len` slots are initialized.
    unsafe { slice::from_raw_parts_mut(start, len) }
}

/// Moves `count` values from `src` to `dest`. The ranges may overlap.
///
/// After the call the source slots are logically uninitialized (their
/// values now live at `dest`) and must not be dropped.
///
/// # Safety
///
/// `src` must hold `count` initialized values and `dest` must be valid for
/// `count` writes. Both must be aligned.
pub unsafe fn relocate<T>(src: *const T, dest: *mut T, count: usize) {
    // SAFETY: upheld by the caller. Moves are bitwise for every `T`.
    unsafe { ptr::copy(src, dest, count) };
}

/// Fills `dest` with clones of `value` and returns it as initialized.
pub fn fill<'a, T: Element>(dest: &'a mut [MaybeUninit<T>], value: &T) -> &'a mut [T] {
    let len = dest.len();
    let start = dest.as_mut_ptr().cast::<T>();

    if T::BITWISE {
        // SAFETY: `start` is valid for `len` writes and `value` is bitwise.
        unsafe { fill_bitwise(start, len, value) };
    } else {
        let mut guard = InitGuard {
            start,
            initialized: 0,
        };
        while guard.initialized < len {
            // SAFETY: slot `initialized` lies within `dest`.
            unsafe { start.add(guard.initialized).write(value.clone()) };
            guard.initialized += 1;
        }
        mem::forget(guard);
    }

    // SAFETY: all `len` slots are initialized.
    unsafe { slice::from_raw_parts_mut(start, len) }
}

/// Raw-pointer form of [`fill`].
///
/// # Safety
///
/// `dest` must be valid for `count` writes and aligned. Existing contents
/// are overwritten without being dropped.
pub unsafe fn fill_n<T: Element>(dest: *mut T, count: usize, value: &T) {
    // SAFETY: upheld by the caller.
    let slots = unsafe { slice::from_raw_parts_mut(dest.cast::<MaybeUninit<T>>(), count) };
    fill(slots, value);
}

/// Initializes slot `i` with `f(i)`, in order.
pub fn fill_with<T>(dest: &mut [MaybeUninit<T>], mut f: impl FnMut(usize) -> T) -> &mut [T] {
    let len = dest.len();
    let start = dest.as_mut_ptr().cast::<T>();
    let mut guard = InitGuard {
        start,
        initialized: 0,
    };
    while guard.initialized < len {
        let value = f(guard.initialized);
        // SAFETY: slot `initialized` lies within `dest`.
        unsafe { start.add(guard.initialized).write(value) };
        guard.initialized += 1;
    }
    mem::forget(guard);
    // SAFETY: all `len` slots are initialized.
    unsafe { slice::from_raw_parts_mut(start, len) }
}

/// Fallible [`fill_with`]. On the first `Err`, the slots built so far are
/// dropped and the error is returned.
pub fn try_fill_with<T, E>(
    dest: &mut [MaybeUninit<T>],
    mut f: impl FnMut(usize) -> Result<T, E>,
) -> Result<&mut [T], E> {
    let len = dest.len();
    let start = dest.as_mut_ptr().cast::<T>();
    let mut guard = InitGuard {
        start,
        initialized: 0,
    };
    while guard.initialized < len {
        let value = f(guard.initialized)?;
        // SAFETY: slot `initialized` lies within `dest`.
        unsafe { start.add(guard.initialized).write(value) };
        guard.initialized += 1;
    }
    mem::forget(guard);
    // SAFETY: all `len` slots are initialized.
    Ok(unsafe { slice::from_raw_parts_mut(start, len) })
}

/// Replicates `value` by doubling: one slot is copied from `value`, then
/// each pass copies the already-filled prefix.
unsafe fn fill_bitwise<T: Element>(start: *mut T, len: usize, value: &T) {
    if len == 0 || mem::size_of::<T>() == 0 {
        return;
    }
    if mem::size_of::<T>() == 1 {
        // SAFETY: a one-byte bitwise value is fully described by its byte.
        let byte = unsafe { *ptr::from_ref(value).cast::<u8>() };
        // SAFETY: `start` is valid for `len` one-byte writes.
        unsafe { ptr::write_bytes(start.cast::<u8>(), byte, len) };
        return;
    }

    // SAFETY: `value` is bitwise, `start` is valid for `len >= 1` writes.
    unsafe { ptr::copy_nonoverlapping(ptr::from_ref(value), start, 1) };
    let mut filled = 1;
    while filled < len {
        let chunk = filled.min(len - filled);
        // SAFETY: `[0, filled)` is initialized and `[filled, filled + chunk)`
        // is in bounds; the two ranges are disjoint.
        unsafe { ptr::copy_nonoverlapping(start, start.add(filled), chunk) };
        filled += chunk;
    }
}
