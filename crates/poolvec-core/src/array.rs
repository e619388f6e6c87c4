//! Pool-backed growable array.
//!
//! [`DynamicArray`] owns one contiguous buffer drawn from a [`PoolHandle`]:
//! `len` live elements followed by `capacity - len` uninitialized slots.
//! Small buffers come from the pool's free lists, large ones from the
//! system source behind it.
//!
//! Growth follows `capacity == 0 ? needed : capacity + max(capacity, extra)`,
//! so repeated pushes double while a single large insertion is sized to fit.
//!
//! Every reallocation is commit-then-free: the new buffer is allocated and
//! the inserted elements are constructed in it before anything is moved out
//! of the old buffer. A panicking constructor therefore leaves the array
//! exactly as it was, with the new buffer returned to the pool.
//!
//! Pool exhaustion is fatal for the infallible methods, which panic with a
//! `poolvec:` message. Use [`DynamicArray::try_reserve`] and
//! [`DynamicArray::try_push`] to observe it instead.
//!
//! Slice methods (`iter`, `get`, `get_unchecked`, `sort`, ...) are
//! available through `Deref<Target = [T]>`.

use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::mem::{self, ManuallyDrop, MaybeUninit};
use std::ops::{Bound, Deref, DerefMut, RangeBounds};
use std::ptr::{self, NonNull};
use std::slice;

use poolvec_pool::{PoolHandle, TypedAllocator};

use crate::element::Element;
use crate::error::ArrayError;
use crate::uninit;

/// Growable array whose storage comes from a [`PoolHandle`].
pub struct DynamicArray<T> {
    /// `None` until the first capacity-consuming operation.
    buf: Option<NonNull<T>>,
    len: usize,
    cap: usize,
    pool: PoolHandle,
    _marker: PhantomData<T>,
}

// SAFETY: the array uniquely owns its elements; the pool handle is
// `Send + Sync` on its own.
unsafe impl<T: Send> Send for DynamicArray<T> {}
unsafe impl<T: Sync> Sync for DynamicArray<T> {}

/// Returns a buffer to the pool unless disarmed with `mem::forget`.
struct BufferGuard<'a, T> {
    pool: &'a PoolHandle,
    buf: NonNull<T>,
    cap: usize,
}

impl<T> Drop for BufferGuard<'_, T> {
    fn drop(&mut self) {
        // SAFETY: `buf` was allocated from `pool` with `cap` slots and holds
        // no live elements the guard is responsible for.
        unsafe { TypedAllocator::new(self.pool).deallocate(self.buf, self.cap) };
    }
}

/// Moves `tail` elements from `base + from` to `base + to` and sets the
/// length to `to + tail` when dropped. Runs on both the normal and the
/// unwinding path.
struct ShiftTail<'a, T> {
    base: *mut T,
    from: usize,
    to: usize,
    tail: usize,
    len: &'a mut usize,
}

impl<T> Drop for ShiftTail<'_, T> {
    fn drop(&mut self) {
        // SAFETY: the constructor's caller guarantees both ranges lie inside
        // the buffer and that `[from, from + tail)` holds live elements.
        unsafe {
            uninit::relocate(self.base.add(self.from), self.base.add(self.to), self.tail);
        }
        *self.len = self.to + self.tail;
    }
}

fn fatal<R>(result: Result<R, ArrayError>) -> R {
    match result {
        Ok(value) => value,
        Err(err) => panic!("poolvec: {err}"),
    }
}

/// # Safety
///
/// `start` must be valid for `count` writes for the returned lifetime.
unsafe fn gap_slots<'a, T>(start: *mut T, count: usize) -> &'a mut [MaybeUninit<T>] {
    // SAFETY: upheld by the caller.
    unsafe { slice::from_raw_parts_mut(start.cast::<MaybeUninit<T>>(), count) }
}

impl<T> DynamicArray<T> {
    /// Empty array on the process-wide pool. Does not allocate.
    pub fn new() -> Self {
        Self::new_in(PoolHandle::global())
    }

    /// Empty array on `pool`. Does not allocate.
    pub fn new_in(pool: PoolHandle) -> Self {
        Self {
            buf: None,
            len: 0,
            cap: 0,
            pool,
            _marker: PhantomData,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_in(capacity, PoolHandle::global())
    }

    pub fn with_capacity_in(capacity: usize, pool: PoolHandle) -> Self {
        let mut array = Self::new_in(pool);
        array.reserve(capacity);
        array
    }

    pub fn pool(&self) -> &PoolHandle {
        &self.pool
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn size(&self) -> usize {
        self.len
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Largest element count a buffer can describe.
    pub fn max_size(&self) -> usize {
        match mem::size_of::<T>() {
            0 => usize::MAX,
            size => isize::MAX as usize / size,
        }
    }

    /// Start of the buffer, or null if nothing has been allocated.
    pub fn data(&self) -> *const T {
        self.buf.map_or(ptr::null(), |buf| buf.as_ptr().cast_const())
    }

    pub fn data_mut(&mut self) -> *mut T {
        self.buf.map_or(ptr::null_mut(), NonNull::as_ptr)
    }

    fn ptr(&self) -> *mut T {
        self.buf.unwrap_or(NonNull::dangling()).as_ptr()
    }

    fn allocator(&self) -> TypedAllocator<'_, T> {
        TypedAllocator::new(&self.pool)
    }

    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `[0, len)` is initialized; `ptr` is aligned and non-null.
        unsafe { slice::from_raw_parts(self.ptr(), self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as above, and `&mut self` makes the borrow unique.
        unsafe { slice::from_raw_parts_mut(self.ptr(), self.len) }
    }

    /// Bounds-checked access.
    pub fn at(&self, index: usize) -> Result<&T, ArrayError> {
        let len = self.len;
        self.as_slice()
            .get(index)
            .ok_or(ArrayError::OutOfBounds { index, len })
    }

    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, ArrayError> {
        let len = self.len;
        self.as_mut_slice()
            .get_mut(index)
            .ok_or(ArrayError::OutOfBounds { index, len })
    }

    pub fn front(&self) -> Option<&T> {
        self.as_slice().first()
    }

    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().first_mut()
    }

    pub fn back(&self) -> Option<&T> {
        self.as_slice().last()
    }

    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().last_mut()
    }

    /// Ensures `capacity() >= capacity`. Never shrinks.
    ///
    /// # Panics
    ///
    /// If the pool cannot supply the buffer.
    pub fn reserve(&mut self, capacity: usize) {
        fatal(self.try_reserve(capacity));
    }

    pub fn try_reserve(&mut self, capacity: usize) -> Result<(), ArrayError> {
        if capacity <= self.cap {
            return Ok(());
        }
        self.relocate_into(capacity)
    }

    /// Reallocates to exactly `len()` slots. An empty array releases its
    /// buffer entirely.
    pub fn shrink_to_fit(&mut self) {
        if self.cap > self.len {
            fatal(self.relocate_into(self.len));
        }
    }

    pub fn push_back(&mut self, value: T) {
        if self.len < self.cap {
            // SAFETY: slot `len` is inside the buffer and uninitialized.
            unsafe { self.ptr().add(self.len).write(value) };
            self.len += 1;
            return;
        }
        let end = self.len;
        fatal(self.insert_gap(end, 1, |gap| {
            gap[0].write(value);
        }));
    }

    /// [`push_back`](Self::push_back) that reports pool exhaustion. On
    /// error `value` is dropped and the array is unchanged.
    pub fn try_push(&mut self, value: T) -> Result<(), ArrayError> {
        let end = self.len;
        self.insert_gap(end, 1, |gap| {
            gap[0].write(value);
        })
    }

    /// Appends the value built by `f`. `f` runs before storage is touched.
    pub fn emplace_back(&mut self, f: impl FnOnce() -> T) -> &mut T {
        self.push_back(f());
        let last = self.len - 1;
        &mut self.as_mut_slice()[last]
    }

    /// Removes the last element. Capacity is kept.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: slot `len` was live and is now outside the array.
        Some(unsafe { self.ptr().add(self.len).read() })
    }

    /// # Panics
    ///
    /// If `index > len()`, or if the pool cannot supply a larger buffer.
    pub fn insert(&mut self, index: usize, value: T) {
        fatal(self.insert_gap(index, 1, |gap| {
            gap[0].write(value);
        }));
    }

    /// Inserts the value built by `f` at `index`. `f` runs before any
    /// element is shifted.
    pub fn emplace(&mut self, index: usize, f: impl FnOnce() -> T) -> &mut T {
        self.insert(index, f());
        &mut self.as_mut_slice()[index]
    }

    /// Removes and returns the element at `index`, shifting the tail left.
    pub fn erase_at(&mut self, index: usize) -> T {
        let len = self.len;
        assert!(index < len, "removal index (is {index}) should be < len (is {len})");
        let base = self.ptr();
        // SAFETY: `index` is live; the tail `(index, len)` is live and moves
        // down by one over the vacated slot.
        unsafe {
            let value = base.add(index).read();
            uninit::relocate(base.add(index + 1), base.add(index), len - index - 1);
            self.len = len - 1;
            value
        }
    }

    /// Drops the elements in `range` and closes the gap.
    ///
    /// # Panics
    ///
    /// If the range is out of bounds or decreasing.
    pub fn erase(&mut self, range: impl RangeBounds<usize>) {
        let (start, end) = self.resolve_range(range);
        if start == end {
            return;
        }
        let base = self.ptr();
        let tail = self.len - end;
        self.len = start;
        // Closes the gap even if an element destructor panics.
        let _shift = ShiftTail {
            base,
            from: end,
            to: start,
            tail,
            len: &mut self.len,
        };
        // SAFETY: `[start, end)` is live and now outside `len`.
        unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(base.add(start), end - start)) };
    }

    fn resolve_range(&self, range: impl RangeBounds<usize>) -> (usize, usize) {
        let len = self.len;
        let start = match range.start_bound() {
            Bound::Included(&start) => start,
            Bound::Excluded(&start) => start.saturating_add(1),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&end) => end.saturating_add(1),
            Bound::Excluded(&end) => end,
            Bound::Unbounded => len,
        };
        assert!(
            start <= end && end <= len,
            "erase range {start}..{end} out of bounds for length {len}"
        );
        (start, end)
    }

    /// Drops elements past `len`. Capacity is kept.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        let dropped = self.len - len;
        self.len = len;
        // SAFETY: `[len, len + dropped)` was live and is now outside `len`.
        unsafe {
            TypedAllocator::destroy_range(NonNull::new_unchecked(self.ptr().add(len)), dropped);
        }
    }

    /// Drops every element. Capacity is kept.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Resizes to `new_len`, building new elements with `f`.
    pub fn resize_with(&mut self, new_len: usize, mut f: impl FnMut() -> T) {
        if new_len <= self.len {
            self.truncate(new_len);
            return;
        }
        let end = self.len;
        fatal(self.insert_gap(end, new_len - end, |gap| {
            uninit::fill_with(gap, |_| f());
        }));
    }

    /// Appends `count` elements built by `f(i)`. If `f` returns `Err`, the
    /// elements built so far are dropped and the array keeps its length,
    /// capacity and buffer.
    ///
    /// # Panics
    ///
    /// If the pool cannot supply a larger buffer.
    pub fn try_extend_with<E>(
        &mut self,
        count: usize,
        f: impl FnMut(usize) -> Result<T, E>,
    ) -> Result<(), E> {
        let end = self.len;
        fatal(self.try_insert_gap(end, count, |gap| {
            uninit::try_fill_with(gap, f).map(|_| ())
        }))
    }

    /// Exchanges contents, capacities and pools.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Moves the contents out, leaving `self` empty and unallocated on the
    /// same pool.
    pub fn take(&mut self) -> Self {
        let pool = self.pool.clone();
        mem::replace(self, Self::new_in(pool))
    }

    /// Capacity after growing to fit `extra` more elements.
    fn grow_capacity(&self, extra: usize) -> Result<usize, ArrayError> {
        let needed = self
            .len
            .checked_add(extra)
            .ok_or(ArrayError::CapacityOverflow)?;
        let grown = if self.cap == 0 {
            needed
        } else {
            self.cap.saturating_add(self.cap.max(extra))
        };
        let grown = grown.min(self.max_size());
        if grown < needed {
            return Err(ArrayError::CapacityOverflow);
        }
        Ok(grown)
    }

    fn allocate_buffer(&self, capacity: usize) -> Result<NonNull<T>, ArrayError> {
        if capacity > self.max_size() {
            return Err(ArrayError::CapacityOverflow);
        }
        Ok(self.allocator().allocate(capacity)?)
    }

    /// Returns the buffer to the pool without dropping elements.
    fn release(&mut self) {
        if let Some(buf) = self.buf.take() {
            // SAFETY: `buf` came from this pool with `cap` slots.
            unsafe { self.allocator().deallocate(buf, self.cap) };
        }
        self.cap = 0;
    }

    /// Moves the live elements into a buffer of exactly `capacity` slots.
    fn relocate_into(&mut self, capacity: usize) -> Result<(), ArrayError> {
        debug_assert!(capacity >= self.len);
        let new_buf = if capacity == 0 {
            None
        } else {
            Some(self.allocate_buffer(capacity)?)
        };
        if let Some(dst) = new_buf {
            // SAFETY: the new buffer is a separate allocation of at least
            // `len` slots.
            unsafe { ptr::copy_nonoverlapping(self.ptr(), dst.as_ptr(), self.len) };
        }
        self.release();
        self.buf = new_buf;
        self.cap = capacity;
        Ok(())
    }

    /// Opens `count` uninitialized slots at `index` and hands them to
    /// `fill`, which must initialize all of them or unwind.
    ///
    /// If `fill` unwinds, the array is left as it was.
    fn insert_gap(
        &mut self,
        index: usize,
        count: usize,
        fill: impl FnOnce(&mut [MaybeUninit<T>]),
    ) -> Result<(), ArrayError> {
        let filled = self.try_insert_gap(index, count, |gap| {
            fill(gap);
            Ok::<(), Infallible>(())
        })?;
        match filled {
            Ok(()) => Ok(()),
            Err(never) => match never {},
        }
    }

    /// Fallible twin of [`insert_gap`](Self::insert_gap). `fill` must
    /// either initialize every slot and return `Ok`, or leave every slot
    /// uninitialized and return `Err`.
    ///
    /// The outer error is pool exhaustion; the inner one comes from `fill`.
    /// On either, or on unwind, buffer, length and capacity are unchanged
    /// and any new buffer goes back to the pool.
    fn try_insert_gap<E>(
        &mut self,
        index: usize,
        count: usize,
        fill: impl FnOnce(&mut [MaybeUninit<T>]) -> Result<(), E>,
    ) -> Result<Result<(), E>, ArrayError> {
        let len = self.len;
        assert!(index <= len, "insertion index (is {index}) should be <= len (is {len})");
        if count == 0 {
            return Ok(Ok(()));
        }
        let new_len = len.checked_add(count).ok_or(ArrayError::CapacityOverflow)?;
        let tail = len - index;

        if new_len <= self.cap {
            let base = self.ptr();
            // Park the tail past the gap; the guard moves it back if `fill`
            // fails or unwinds.
            self.len = index;
            // SAFETY: `[index, len)` is live and `index + count + tail` is
            // within capacity.
            unsafe { uninit::relocate(base.add(index), base.add(index + count), tail) };
            let shift = ShiftTail {
                base,
                from: index + count,
                to: index,
                tail,
                len: &mut self.len,
            };
            // SAFETY: the gap is inside the buffer and holds no live values.
            if let Err(err) = fill(unsafe { gap_slots(base.add(index), count) }) {
                drop(shift);
                return Ok(Err(err));
            }
            mem::forget(shift);
            self.len = new_len;
            return Ok(Ok(()));
        }

        let new_cap = self.grow_capacity(count)?;
        let new_buf = self.allocate_buffer(new_cap)?;
        let dst = new_buf.as_ptr();
        {
            let guard = BufferGuard {
                pool: &self.pool,
                buf: new_buf,
                cap: new_cap,
            };
            // SAFETY: `index + count <= new_cap`.
            if let Err(err) = fill(unsafe { gap_slots(dst.add(index), count) }) {
                drop(guard);
                return Ok(Err(err));
            }
            mem::forget(guard);
        }

        let src = self.ptr();
        // SAFETY: distinct buffers; prefix and suffix land on either side of
        // the filled gap.
        unsafe {
            ptr::copy_nonoverlapping(src, dst, index);
            ptr::copy_nonoverlapping(src.add(index), dst.add(index + count), tail);
        }
        self.release();
        self.buf = Some(new_buf);
        self.cap = new_cap;
        self.len = new_len;
        Ok(Ok(()))
    }
}

impl<T: Element> DynamicArray<T> {
    /// `count` clones of `value`, with capacity exactly `count`.
    pub fn from_elem(count: usize, value: &T) -> Self {
        Self::from_elem_in(count, value, PoolHandle::global())
    }

    pub fn from_elem_in(count: usize, value: &T, pool: PoolHandle) -> Self {
        let mut array = Self::new_in(pool);
        array.insert_n(0, count, value);
        array
    }

    /// Clones of `src`, with capacity exactly `src.len()`.
    pub fn from_slice(src: &[T]) -> Self {
        Self::from_slice_in(src, PoolHandle::global())
    }

    pub fn from_slice_in(src: &[T], pool: PoolHandle) -> Self {
        let mut array = Self::new_in(pool);
        array.insert_slice(0, src);
        array
    }

    /// Inserts `count` clones of `value` at `index`.
    pub fn insert_n(&mut self, index: usize, count: usize, value: &T) {
        fatal(self.insert_gap(index, count, |gap| {
            uninit::fill(gap, value);
        }));
    }

    /// Inserts clones of `src` at `index`.
    pub fn insert_slice(&mut self, index: usize, src: &[T]) {
        fatal(self.insert_gap(index, src.len(), |gap| {
            uninit::copy(src, gap);
        }));
    }

    pub fn extend_from_slice(&mut self, src: &[T]) {
        let end = self.len;
        self.insert_slice(end, src);
    }

    /// Resizes to `new_len`, filling new slots with clones of `value`.
    pub fn resize(&mut self, new_len: usize, value: T) {
        if new_len <= self.len {
            self.truncate(new_len);
            return;
        }
        let end = self.len;
        self.insert_n(end, new_len - end, &value);
    }

    /// Replaces the contents with `count` clones of `value`. Capacity never
    /// shrinks.
    pub fn assign(&mut self, count: usize, value: &T) {
        self.clear();
        self.reserve(count);
        self.insert_n(0, count, value);
    }

    /// Replaces the contents with clones of `src`. Capacity never shrinks.
    pub fn assign_slice(&mut self, src: &[T]) {
        self.clear();
        self.reserve(src.len());
        self.insert_slice(0, src);
    }
}

impl<T> Drop for DynamicArray<T> {
    fn drop(&mut self) {
        let Some(buf) = self.buf else {
            return;
        };
        let _release = BufferGuard {
            pool: &self.pool,
            buf,
            cap: self.cap,
        };
        // SAFETY: `[0, len)` is live and never used again.
        unsafe { TypedAllocator::destroy_range(buf, self.len) };
    }
}

impl<T> Default for DynamicArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Element> Clone for DynamicArray<T> {
    /// Deep copy on the same pool, with capacity equal to length.
    fn clone(&self) -> Self {
        Self::from_slice_in(self, self.pool.clone())
    }
}

impl<T> Deref for DynamicArray<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for DynamicArray<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T> AsRef<[T]> for DynamicArray<T> {
    fn as_ref(&self) -> &[T] {
        self
    }
}

impl<T> AsMut<[T]> for DynamicArray<T> {
    fn as_mut(&mut self) -> &mut [T] {
        self
    }
}

impl<T: fmt::Debug> fmt::Debug for DynamicArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for DynamicArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: PartialEq> PartialEq<[T]> for DynamicArray<T> {
    fn eq(&self, other: &[T]) -> bool {
        self.as_slice() == other
    }
}

impl<T: PartialEq, const N: usize> PartialEq<[T; N]> for DynamicArray<T> {
    fn eq(&self, other: &[T; N]) -> bool {
        self.as_slice() == other
    }
}

impl<T: Eq> Eq for DynamicArray<T> {}

impl<T: PartialOrd> PartialOrd for DynamicArray<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.as_slice().partial_cmp(other.as_slice())
    }
}

impl<T: Ord> Ord for DynamicArray<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_slice().cmp(other.as_slice())
    }
}

impl<T: Hash> Hash for DynamicArray<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<T> Extend<T> for DynamicArray<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        if lower > self.cap - self.len {
            let capacity = fatal(self.grow_capacity(lower));
            self.reserve(capacity);
        }
        for value in iter {
            self.push_back(value);
        }
    }
}

impl<'a, T: Element + 'a> Extend<&'a T> for DynamicArray<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().cloned());
    }
}

impl<T> FromIterator<T> for DynamicArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut array = Self::new();
        array.extend(iter);
        array
    }
}

impl<T, const N: usize> From<[T; N]> for DynamicArray<T> {
    fn from(values: [T; N]) -> Self {
        let values = ManuallyDrop::new(values);
        let mut array = Self::new();
        fatal(array.insert_gap(0, N, |gap| {
            // SAFETY: the gap has exactly `N` slots; ownership of the values
            // moves into it and `values` is never dropped.
            unsafe { ptr::copy_nonoverlapping(values.as_ptr(), gap.as_mut_ptr().cast::<T>(), N) };
        }));
        array
    }
}

impl<T: Element> From<&[T]> for DynamicArray<T> {
    fn from(src: &[T]) -> Self {
        Self::from_slice(src)
    }
}

impl<'a, T> IntoIterator for &'a DynamicArray<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut DynamicArray<T> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T> IntoIterator for DynamicArray<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        let this = ManuallyDrop::new(self);
        IntoIter {
            buf: this.buf,
            cap: this.cap,
            front: 0,
            back: this.len,
            // SAFETY: `this` is never dropped, so the handle moves out once.
            pool: unsafe { ptr::read(&this.pool) },
            _marker: PhantomData,
        }
    }
}

/// Owning iterator. Unyielded elements are dropped and the buffer goes back
/// to the pool when the iterator is dropped.
pub struct IntoIter<T> {
    buf: Option<NonNull<T>>,
    cap: usize,
    front: usize,
    back: usize,
    pool: PoolHandle,
    _marker: PhantomData<T>,
}

// SAFETY: same ownership argument as `DynamicArray`.
unsafe impl<T: Send> Send for IntoIter<T> {}
unsafe impl<T: Sync> Sync for IntoIter<T> {}

impl<T> IntoIter<T> {
    fn ptr(&self) -> *mut T {
        self.buf.unwrap_or(NonNull::dangling()).as_ptr()
    }

    /// Elements not yet yielded.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `[front, back)` is live.
        unsafe { slice::from_raw_parts(self.ptr().add(self.front), self.back - self.front) }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        // SAFETY: `front` is live and is moved out exactly once.
        let value = unsafe { self.ptr().add(self.front).read() };
        self.front += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        // SAFETY: `back` was live and is moved out exactly once.
        Some(unsafe { self.ptr().add(self.back).read() })
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        let Some(buf) = self.buf else {
            return;
        };
        let _release = BufferGuard {
            pool: &self.pool,
            buf,
            cap: self.cap,
        };
        // SAFETY: `[front, back)` is live and never yielded.
        unsafe {
            TypedAllocator::destroy_range(buf.add(self.front), self.back - self.front);
        }
    }
}

/// Builds a [`DynamicArray`] on the process-wide pool.
///
/// ```
/// # use poolvec_core::dynarray;
/// let a = dynarray![1, 2, 3];
/// let b = dynarray![0_u8; 4];
/// assert_eq!(a.capacity(), 3);
/// assert_eq!(b.as_slice(), &[0, 0, 0, 0]);
/// ```
#[macro_export]
macro_rules! dynarray {
    () => {
        $crate::DynamicArray::new()
    };
    ($elem:expr; $n:expr) => {
        $crate::DynamicArray::from_elem($n, &$elem)
    };
    ($($x:expr),+ $(,)?) => {
        $crate::DynamicArray::from([$($x),+])
    };
}
