//! System memory sources.
//!
//! The pool obtains arena chunks and oversize blocks from a
//! [`SystemSource`]. [`HeapSource`] wraps the process's system allocator and
//! can enforce a byte limit, which makes exhaustion reproducible.

use std::alloc::{GlobalAlloc, Layout, System};
use std::ptr::NonNull;

/// Raw memory provider behind the pool.
pub trait SystemSource: Send {
    /// Returns `None` when the request cannot be satisfied.
    /// `layout.size()` is never zero.
    fn allocate(&mut self, layout: Layout) -> Option<NonNull<u8>>;

    /// # Safety
    ///
    /// `ptr` must come from `allocate` on this source with the same `layout`.
    unsafe fn deallocate(&mut self, ptr: NonNull<u8>, layout: Layout);

    /// Bytes currently held by callers.
    fn outstanding(&self) -> usize;
}

/// `malloc`/`free` equivalent built on [`std::alloc::System`].
#[derive(Debug, Default)]
pub struct HeapSource {
    limit: Option<usize>,
    outstanding: usize,
}

impl HeapSource {
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            limit,
            outstanding: 0,
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}

impl SystemSource for HeapSource {
    fn allocate(&mut self, layout: Layout) -> Option<NonNull<u8>> {
        debug_assert!(layout.size() > 0, "zero-sized system request");
        let next = self.outstanding.checked_add(layout.size())?;
        if self.limit.is_some_and(|limit| next > limit) {
            return None;
        }
        // SAFETY: layout has a non-zero size.
        let ptr = NonNull::new(unsafe { System.alloc(layout) })?;
        self.outstanding = next;
        Some(ptr)
    }

    unsafe fn deallocate(&mut self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: caller guarantees `ptr` was returned by `allocate(layout)`.
        unsafe { System.dealloc(ptr.as_ptr(), layout) };
        self.outstanding = self.outstanding.saturating_sub(layout.size());
    }

    fn outstanding(&self) -> usize {
        self.outstanding
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlimited_allocate_and_free() {
        let mut source = HeapSource::new(None);
        let layout = Layout::from_size_align(256, 8).unwrap();
        let ptr = source.allocate(layout).unwrap();
        assert_eq!(source.outstanding(), 256);
        // SAFETY: ptr came from this source with this layout.
        unsafe { source.deallocate(ptr, layout) };
        assert_eq!(source.outstanding(), 0);
    }

    #[test]
    fn limit_refuses_overflowing_request() {
        let mut source = HeapSource::new(Some(300));
        let layout = Layout::from_size_align(200, 8).unwrap();
        let first = source.allocate(layout).unwrap();
        assert!(source.allocate(layout).is_none());
        assert_eq!(source.outstanding(), 200);

        // SAFETY: first came from this source with this layout.
        unsafe { source.deallocate(first, layout) };
        let again = source.allocate(layout).unwrap();
        // SAFETY: again came from this source with this layout.
        unsafe { source.deallocate(again, layout) };
        assert_eq!(source.limit(), Some(300));
    }
}
