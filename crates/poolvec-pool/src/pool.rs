//! Two-level small-object pool.
//!
//! Requests up to `max_block` bytes are served from per-size-class free
//! lists; requests above it (or with stricter alignment than `align`) go
//! straight to the [`SystemSource`]. Empty free lists are refilled from a
//! contiguous arena that grows in bulk:
//!
//! ```text
//!   allocate(n) ──> n > max_block ──────────────────────────> system source
//!        │
//!        └─> free_lists[index(n)] ── non-empty ──> pop head
//!                    │
//!                    └─ empty ──> refill(round_up(n))
//!                                    └─> chunk_alloc(size, nobjs)
//!                                          1. arena holds nobjs blocks: carve them
//!                                          2. arena holds >= 1 block: carve what fits
//!                                          3. donate remainder, grow arena from system,
//!                                             or scavenge a larger free block
//! ```
//!
//! Free blocks carry no header. While a block sits on a free list its first
//! word is a [`FreeNode`] link; once handed out it is opaque caller memory.
//! The caller must therefore pass the same size to `deallocate` that it
//! passed to `allocate`.
//!
//! The pool performs no locking. Share it through [`crate::PoolHandle`].

use std::alloc::Layout;
use std::ptr::{self, NonNull};

use serde::Serialize;

use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::log::{LifecycleLog, LogEvent, PoolLogLevel, PoolLogRecord};
use crate::size_class::SizeClassTable;
use crate::source::{HeapSource, SystemSource};

/// Forward link stored in the first word of a free block.
#[repr(C)]
struct FreeNode {
    next: Option<NonNull<FreeNode>>,
}

/// A slab obtained from the system for arena use. Released on drop.
#[derive(Debug)]
struct ArenaChunk {
    base: NonNull<u8>,
    layout: Layout,
}

#[derive(Debug, Default, Clone, Copy)]
struct PoolCounters {
    free_list_hits: u64,
    refills: u64,
    chunk_grows: u64,
    scavenges: u64,
    donations: u64,
    large_live: usize,
}

/// Point-in-time pool statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Cumulative bytes requested for arena growth.
    pub heap_size: usize,
    /// Bytes left in the current arena.
    pub arena_remaining: usize,
    /// Bytes currently held from the system source (arenas + large blocks).
    pub system_bytes_outstanding: usize,
    /// Free block count per bucket.
    pub free_blocks: Vec<usize>,
    /// Oversize blocks handed out and not yet returned.
    pub large_live: usize,
    pub free_list_hits: u64,
    pub refills: u64,
    pub chunk_grows: u64,
    pub scavenges: u64,
    pub donations: u64,
}

/// Size-class free-list allocator backed by a bump arena.
pub struct FixedSizePool {
    config: PoolConfig,
    classes: SizeClassTable,
    free_lists: Box<[Option<NonNull<FreeNode>>]>,
    free_counts: Box<[usize]>,
    /// Current arena `[arena_start, arena_end)`; both null when empty.
    arena_start: *mut u8,
    arena_end: *mut u8,
    heap_size: usize,
    chunks: Vec<ArenaChunk>,
    source: Box<dyn SystemSource>,
    counters: PoolCounters,
    log: LifecycleLog,
}

// SAFETY: every raw pointer held here refers to memory exclusively owned by
// the pool (arena chunks and the free blocks carved from them). Moving the
// pool to another thread moves that ownership with it.
unsafe impl Send for FixedSizePool {}

impl FixedSizePool {
    /// Creates a pool over the system allocator.
    pub fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let source = HeapSource::new(config.heap_limit);
        Self::with_source(config, Box::new(source))
    }

    /// Creates a pool over a caller-supplied memory source. The config's
    /// `heap_limit` is not applied to custom sources.
    pub fn with_source(
        config: PoolConfig,
        source: Box<dyn SystemSource>,
    ) -> Result<Self, PoolError> {
        config.validate()?;
        Ok(Self::build(config, source))
    }

    /// Default-configured pool; cannot fail validation.
    pub fn with_defaults() -> Self {
        Self::build(PoolConfig::default(), Box::new(HeapSource::new(None)))
    }

    fn build(config: PoolConfig, source: Box<dyn SystemSource>) -> Self {
        let classes = SizeClassTable::new(config.align, config.max_block);
        let log = LifecycleLog::new(config.log_level, config.log_capacity);
        Self {
            free_lists: vec![None; classes.len()].into_boxed_slice(),
            free_counts: vec![0; classes.len()].into_boxed_slice(),
            classes,
            config,
            arena_start: ptr::null_mut(),
            arena_end: ptr::null_mut(),
            heap_size: 0,
            chunks: Vec::new(),
            source,
            counters: PoolCounters::default(),
            log,
        }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn size_classes(&self) -> SizeClassTable {
        self.classes
    }

    /// Cumulative bytes requested from the system for arena growth.
    pub fn heap_size(&self) -> usize {
        self.heap_size
    }

    pub fn arena_remaining(&self) -> usize {
        self.arena_end as usize - self.arena_start as usize
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            heap_size: self.heap_size,
            arena_remaining: self.arena_remaining(),
            system_bytes_outstanding: self.source.outstanding(),
            free_blocks: self.free_counts.to_vec(),
            large_live: self.counters.large_live,
            free_list_hits: self.counters.free_list_hits,
            refills: self.counters.refills,
            chunk_grows: self.counters.chunk_grows,
            scavenges: self.counters.scavenges,
            donations: self.counters.donations,
        }
    }

    pub fn logs(&self) -> Vec<PoolLogRecord> {
        self.log.records().cloned().collect()
    }

    pub fn drain_logs(&mut self) -> Vec<PoolLogRecord> {
        self.log.drain()
    }

    /// Allocates at least `n` bytes aligned to `config.align`.
    ///
    /// `n == 0` is served as one minimum-size block.
    pub fn allocate(&mut self, n: usize) -> Result<NonNull<u8>, PoolError> {
        if !self.classes.is_small(n) {
            let layout = self.large_layout(n)?;
            return self.allocate_large(layout);
        }

        let bin = self.classes.index(n);
        if let Some(block) = self.pop_free(bin) {
            self.counters.free_list_hits += 1;
            self.note(PoolLogLevel::Trace, "allocate", "alloc", |event| {
                event
                    .ptr(block.as_ptr())
                    .size(n)
                    .bin(bin)
                    .details("path=free_list_hit")
            });
            return Ok(block);
        }

        let size = self.classes.round_up(n);
        let block = self.refill(size)?;
        self.note(PoolLogLevel::Trace, "allocate", "alloc", |event| {
            event
                .ptr(block.as_ptr())
                .size(n)
                .bin(bin)
                .details("path=refill")
        });
        Ok(block)
    }

    /// Returns a block to its bucket (or to the system for oversize blocks).
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by [`Self::allocate`] on this pool with
    /// the same `n`, and must not be used afterwards. Passing a different
    /// size files the block under the wrong bucket; nothing detects it.
    pub unsafe fn deallocate(&mut self, ptr: NonNull<u8>, n: usize) {
        if !self.classes.is_small(n) {
            if let Ok(layout) = self.large_layout(n) {
                // SAFETY: forwarded caller contract.
                unsafe { self.deallocate_large(ptr, layout) };
            }
            return;
        }

        let bin = self.classes.index(n);
        // SAFETY: the block is at least one bucket unit (>= one word) and
        // aligned to `align`, and the caller gave up ownership.
        unsafe { self.push_free(bin, ptr) };
        self.note(PoolLogLevel::Trace, "deallocate", "dealloc", |event| {
            event
                .ptr(ptr.as_ptr())
                .size(n)
                .bin(bin)
        });
    }

    /// Deallocate-then-allocate. Not a resize: contents are not preserved
    /// and the old block may come straight back. Callers that need the data
    /// must copy it out first.
    ///
    /// # Safety
    ///
    /// Same contract as [`Self::deallocate`] for `ptr` and `old_n`.
    pub unsafe fn reallocate(
        &mut self,
        ptr: NonNull<u8>,
        old_n: usize,
        new_n: usize,
    ) -> Result<NonNull<u8>, PoolError> {
        // SAFETY: forwarded caller contract.
        unsafe { self.deallocate(ptr, old_n) };
        self.allocate(new_n)
    }

    /// Layout-aware allocation. Alignments above `config.align` bypass the
    /// free lists.
    pub fn allocate_layout(&mut self, layout: Layout) -> Result<NonNull<u8>, PoolError> {
        if layout.align() > self.config.align {
            return self.allocate_large(normalize_zero(layout));
        }
        self.allocate(layout.size())
    }

    /// # Safety
    ///
    /// `ptr` must come from [`Self::allocate_layout`] with the same `layout`.
    pub unsafe fn deallocate_layout(&mut self, ptr: NonNull<u8>, layout: Layout) {
        if layout.align() > self.config.align {
            // SAFETY: forwarded caller contract.
            unsafe { self.deallocate_large(ptr, normalize_zero(layout)) };
            return;
        }
        // SAFETY: forwarded caller contract.
        unsafe { self.deallocate(ptr, layout.size()) };
    }

    fn large_layout(&self, n: usize) -> Result<Layout, PoolError> {
        Layout::from_size_align(n, self.config.align)
            .map_err(|_| PoolError::ResourceExhausted { requested: n })
    }

    fn allocate_large(&mut self, layout: Layout) -> Result<NonNull<u8>, PoolError> {
        match self.source.allocate(layout) {
            Some(ptr) => {
                self.counters.large_live += 1;
                self.note(PoolLogLevel::Trace, "allocate", "alloc", |event| {
                    event
                        .ptr(ptr.as_ptr())
                        .size(layout.size())
                        .details(format!("path=large align={}", layout.align()))
                });
                Ok(ptr)
            }
            None => {
                self.note(PoolLogLevel::Error, "allocate", "resource_exhausted", |event| {
                    event
                        .size(layout.size())
                        .outcome("failed")
                        .details("path=large")
                });
                Err(PoolError::ResourceExhausted {
                    requested: layout.size(),
                })
            }
        }
    }

    unsafe fn deallocate_large(&mut self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: caller guarantees the block came from `allocate_large`.
        unsafe { self.source.deallocate(ptr, layout) };
        self.counters.large_live = self.counters.large_live.saturating_sub(1);
        self.note(PoolLogLevel::Trace, "deallocate", "dealloc", |event| {
            event
                .ptr(ptr.as_ptr())
                .size(layout.size())
                .details("path=large")
        });
    }

    /// Obtains `refill_objects` blocks of `size` bytes, returns the first and
    /// threads the rest onto the bucket for `size`.
    fn refill(&mut self, size: usize) -> Result<NonNull<u8>, PoolError> {
        let (chunk, nobjs) = self.chunk_alloc(size, self.config.refill_objects)?;
        self.counters.refills += 1;

        if nobjs > 1 {
            let bin = self.classes.index(size);
            let base = chunk.as_ptr();
            let mut head = self.free_lists[bin];
            // Back to front so the list runs in address order.
            for i in (1..nobjs).rev() {
                // SAFETY: block i lies inside the chunk just carved
                // (`nobjs * size` bytes), is `align`-aligned, and is unused.
                let node = unsafe { base.add(i * size) }.cast::<FreeNode>();
                unsafe { node.write(FreeNode { next: head }) };
                head = NonNull::new(node);
            }
            self.free_lists[bin] = head;
            self.free_counts[bin] += nobjs - 1;
        }

        let bin = self.classes.index(size);
        self.note(PoolLogLevel::Debug, "refill", "refill", |event| {
            event
                .ptr(chunk.as_ptr())
                .size(size)
                .bin(bin)
                .details(format!("nobjs={nobjs}"))
        });
        Ok(chunk)
    }

    /// Carves `nobjs` blocks of `size` bytes from the arena, growing or
    /// replacing the arena as needed. Returns the chunk and how many blocks
    /// it actually holds (between 1 and `nobjs`).
    fn chunk_alloc(
        &mut self,
        size: usize,
        nobjs: usize,
    ) -> Result<(NonNull<u8>, usize), PoolError> {
        let total = size
            .checked_mul(nobjs)
            .ok_or(PoolError::ResourceExhausted { requested: usize::MAX })?;

        loop {
            let left = self.arena_remaining();

            if left >= total {
                let chunk = self.carve(total);
                self.note(PoolLogLevel::Debug, "chunk_alloc", "carve", |event| {
                    event
                        .ptr(chunk.as_ptr())
                        .size(total)
                        .details(format!("tier=full nobjs={nobjs}"))
                });
                return Ok((chunk, nobjs));
            }

            if left >= size {
                let fit = left / size;
                let chunk = self.carve(fit * size);
                self.note(PoolLogLevel::Debug, "chunk_alloc", "carve", |event| {
                    event
                        .ptr(chunk.as_ptr())
                        .size(fit * size)
                        .details(format!("tier=partial nobjs={fit}"))
                });
                return Ok((chunk, fit));
            }

            self.donate_remainder();

            let headroom = (self.heap_size >> 4).next_multiple_of(self.config.align);
            let bytes_to_get = total
                .checked_mul(2)
                .and_then(|bytes| bytes.checked_add(headroom))
                .ok_or(PoolError::ResourceExhausted { requested: usize::MAX })?;

            if self.grow_arena(bytes_to_get) {
                continue;
            }

            if !self.scavenge(size) {
                self.note(PoolLogLevel::Error, "chunk_alloc", "resource_exhausted", |event| {
                    event
                        .size(bytes_to_get)
                        .outcome("failed")
                        .details(format!("block_size={size}"))
                });
                return Err(PoolError::ResourceExhausted {
                    requested: bytes_to_get,
                });
            }
        }
    }

    /// Advances the arena start by `bytes`; the caller checked the fit.
    fn carve(&mut self, bytes: usize) -> NonNull<u8> {
        debug_assert!(bytes <= self.arena_remaining());
        let start = self.arena_start;
        // SAFETY: `bytes` fits in the current arena, so the result stays in
        // bounds of the chunk `arena_start` points into.
        self.arena_start = unsafe { start.add(bytes) };
        // SAFETY: callers only carve a non-empty arena, so start is non-null.
        unsafe { NonNull::new_unchecked(start) }
    }

    /// Files whatever is left of the arena (less than one block of the size
    /// being refilled) under its own bucket, then empties the arena.
    fn donate_remainder(&mut self) {
        let left = self.arena_remaining();
        if left > 0 {
            let bin = self.classes.index(left);
            let start = self.arena_start;
            // SAFETY: the remainder is a non-empty multiple of `align` inside
            // an arena chunk and is not referenced by anyone.
            unsafe { self.push_free(bin, NonNull::new_unchecked(start)) };
            self.counters.donations += 1;
            self.note(PoolLogLevel::Debug, "chunk_alloc", "donate_remainder", |event| {
                event
                    .ptr(start)
                    .size(left)
                    .bin(bin)
            });
        }
        self.arena_start = ptr::null_mut();
        self.arena_end = ptr::null_mut();
    }

    fn grow_arena(&mut self, bytes: usize) -> bool {
        let Ok(layout) = Layout::from_size_align(bytes, self.config.align) else {
            return false;
        };
        let Some(base) = self.source.allocate(layout) else {
            self.note(PoolLogLevel::Warn, "chunk_alloc", "grow", |event| {
                event
                    .size(bytes)
                    .outcome("refused")
                    .details("system source refused arena growth")
            });
            return false;
        };
        self.chunks.push(ArenaChunk { base, layout });
        self.heap_size += bytes;
        self.arena_start = base.as_ptr();
        // SAFETY: the chunk is exactly `bytes` long.
        self.arena_end = unsafe { base.as_ptr().add(bytes) };
        self.counters.chunk_grows += 1;
        self.note(PoolLogLevel::Debug, "chunk_alloc", "grow", |event| {
            event
                .ptr(base.as_ptr())
                .size(bytes)
                .details("tier=grow")
        });
        true
    }

    /// Takes one free block of at least `size` bytes, smallest bucket
    /// first, and installs it as the arena.
    fn scavenge(&mut self, size: usize) -> bool {
        for class in self.classes.sizes_from(size) {
            let bin = self.classes.index(class);
            if let Some(block) = self.pop_free(bin) {
                self.arena_start = block.as_ptr();
                // SAFETY: the block spans `class` bytes.
                self.arena_end = unsafe { block.as_ptr().add(class) };
                self.counters.scavenges += 1;
                self.note(PoolLogLevel::Warn, "chunk_alloc", "scavenge", |event| {
                    event
                        .ptr(block.as_ptr())
                        .size(class)
                        .bin(bin)
                        .details(format!("tier=scavenge wanted={size}"))
                });
                return true;
            }
        }
        false
    }

    fn pop_free(&mut self, bin: usize) -> Option<NonNull<u8>> {
        let head = self.free_lists[bin]?;
        // SAFETY: every node on a free list was written by `push_free` or
        // `refill` and has not been handed out since.
        self.free_lists[bin] = unsafe { head.as_ref().next };
        self.free_counts[bin] -= 1;
        Some(head.cast())
    }

    /// # Safety
    ///
    /// `block` must be unused, `align`-aligned and at least one word long.
    unsafe fn push_free(&mut self, bin: usize, block: NonNull<u8>) {
        let node = block.cast::<FreeNode>();
        // SAFETY: upheld by the caller.
        unsafe {
            node.write(FreeNode {
                next: self.free_lists[bin],
            })
        };
        self.free_lists[bin] = Some(node);
        self.free_counts[bin] += 1;
    }

    /// Records a lifecycle event. `build` only runs when `level` passes the
    /// log threshold.
    fn note(
        &mut self,
        level: PoolLogLevel,
        symbol: &'static str,
        kind: &'static str,
        build: impl FnOnce(LogEvent) -> LogEvent,
    ) {
        if !self.log.enabled(level) {
            return;
        }
        let event = build(LogEvent::new(level, symbol, kind));
        let (heap_size, remaining) = (self.heap_size, self.arena_remaining());
        self.log.record(event, heap_size, remaining);
    }
}

impl Default for FixedSizePool {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Drop for FixedSizePool {
    fn drop(&mut self) {
        for chunk in self.chunks.drain(..) {
            // SAFETY: each chunk was obtained from this source with this
            // layout, and nothing can use pool blocks once the pool is gone.
            unsafe { self.source.deallocate(chunk.base, chunk.layout) };
        }
    }
}

impl std::fmt::Debug for FixedSizePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedSizePool")
            .field("config", &self.config)
            .field("heap_size", &self.heap_size)
            .field("arena_remaining", &self.arena_remaining())
            .field("chunks", &self.chunks.len())
            .finish_non_exhaustive()
    }
}

/// System sources never see zero-sized layouts.
fn normalize_zero(layout: Layout) -> Layout {
    if layout.size() == 0 {
        // align is a non-zero power of two, so this cannot fail.
        Layout::from_size_align(layout.align(), layout.align()).unwrap_or(layout)
    } else {
        layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> FixedSizePool {
        FixedSizePool::new(PoolConfig::default().with_log_level(PoolLogLevel::Trace)).unwrap()
    }

    #[test]
    fn test_first_allocation_refills_bucket() {
        let mut pool = pool();
        let block = pool.allocate(64).unwrap();
        assert_eq!(block.as_ptr() as usize % 8, 0);

        let stats = pool.stats();
        // 2 * 64 * 20 bytes requested, 20 blocks carved, 19 left on the list.
        assert_eq!(stats.heap_size, 2560);
        assert_eq!(stats.arena_remaining, 1280);
        assert_eq!(stats.free_blocks[7], 19);
        assert_eq!(stats.refills, 1);
        assert_eq!(stats.chunk_grows, 1);
        // SAFETY: allocated above with size 64.
        unsafe { pool.deallocate(block, 64) };
    }

    #[test]
    fn test_freed_block_is_reused() {
        let mut pool = pool();
        let first = pool.allocate(64).unwrap();
        let second = pool.allocate(64).unwrap();
        assert_ne!(first, second);
        // SAFETY: allocated above with size 64.
        unsafe { pool.deallocate(first, 64) };
        let third = pool.allocate(64).unwrap();
        assert_eq!(third, first);
        assert_eq!(pool.stats().free_list_hits, 2);
    }

    #[test]
    fn test_refilled_blocks_are_contiguous() {
        let mut pool = pool();
        let first = pool.allocate(24).unwrap().as_ptr() as usize;
        for i in 1..20 {
            let next = pool.allocate(24).unwrap().as_ptr() as usize;
            assert_eq!(next, first + i * 24);
        }
        assert_eq!(pool.stats().free_blocks[2], 0);
    }

    #[test]
    fn test_large_request_bypasses_pool() {
        let mut pool = pool();
        let block = pool.allocate(130).unwrap();
        let stats = pool.stats();
        assert_eq!(stats.large_live, 1);
        assert_eq!(stats.heap_size, 0);
        assert_eq!(stats.system_bytes_outstanding, 130);
        assert!(stats.free_blocks.iter().all(|&n| n == 0));

        // SAFETY: allocated above with size 130.
        unsafe { pool.deallocate(block, 130) };
        let stats = pool.stats();
        assert_eq!(stats.large_live, 0);
        assert_eq!(stats.system_bytes_outstanding, 0);
    }

    #[test]
    fn test_zero_byte_request_gets_minimum_block() {
        let mut pool = pool();
        let block = pool.allocate(0).unwrap();
        assert_eq!(pool.stats().free_blocks[0], 19);
        // SAFETY: allocated above with size 0.
        unsafe { pool.deallocate(block, 0) };
        assert_eq!(pool.stats().free_blocks[0], 20);
    }

    #[test]
    fn test_partial_carve_when_arena_is_short() {
        let mut pool = pool();
        let _ = pool.allocate(64).unwrap();
        // 1280 bytes left: only 10 of 20 requested 128-byte blocks fit.
        let _ = pool.allocate(128).unwrap();
        let stats = pool.stats();
        assert_eq!(stats.arena_remaining, 0);
        assert_eq!(stats.free_blocks[15], 9);
        assert_eq!(stats.chunk_grows, 1);
    }

    #[test]
    fn test_remainder_is_donated_on_growth() {
        let mut pool = pool();
        // 2 * 40 * 20 = 1600 bytes; 800 carved, 800 left.
        let _ = pool.allocate(40).unwrap();
        // 96 * 8 = 768 carved from the 800 left, 32 remain.
        let _ = pool.allocate(96).unwrap();
        assert_eq!(pool.arena_remaining(), 32);
        // 120 > 32: the 32-byte remainder lands in bucket 3, then the arena grows.
        let _ = pool.allocate(120).unwrap();
        let stats = pool.stats();
        assert_eq!(stats.donations, 1);
        assert_eq!(stats.free_blocks[3], 1);
        assert_eq!(stats.chunk_grows, 2);
        // second growth adds round_up(1600 / 16) = 104 bytes of headroom.
        assert_eq!(stats.heap_size, 1600 + 2 * 120 * 20 + 104);
    }

    #[test]
    fn test_reallocate_same_bucket_returns_same_block() {
        let mut pool = pool();
        let block = pool.allocate(20).unwrap();
        // SAFETY: allocated above with size 20.
        let moved = unsafe { pool.reallocate(block, 20, 24) }.unwrap();
        assert_eq!(moved, block);
        // SAFETY: reallocated above with size 24.
        let moved = unsafe { pool.reallocate(moved, 24, 200) }.unwrap();
        assert_eq!(pool.stats().large_live, 1);
        // SAFETY: reallocated above with size 200.
        unsafe { pool.deallocate(moved, 200) };
    }

    #[test]
    fn test_over_aligned_layout_goes_to_system() {
        let mut pool = pool();
        let layout = Layout::from_size_align(32, 64).unwrap();
        let block = pool.allocate_layout(layout).unwrap();
        assert_eq!(block.as_ptr() as usize % 64, 0);
        assert_eq!(pool.stats().large_live, 1);
        // SAFETY: allocated above with this layout.
        unsafe { pool.deallocate_layout(block, layout) };
        assert_eq!(pool.stats().large_live, 0);
    }

    #[test]
    fn test_lifecycle_log_records_paths() {
        let mut pool = pool();
        let a = pool.allocate(16).unwrap();
        // SAFETY: allocated above with size 16.
        unsafe { pool.deallocate(a, 16) };
        let _ = pool.allocate(16).unwrap();

        let logs = pool.drain_logs();
        let details: Vec<_> = logs
            .iter()
            .filter(|r| r.event == "alloc")
            .map(|r| r.details.as_str())
            .collect();
        assert_eq!(details, vec!["path=refill", "path=free_list_hit"]);
        assert!(logs.iter().any(|r| r.event == "grow"));
        assert!(logs.iter().any(|r| r.event == "dealloc"));
        assert!(pool.logs().is_empty());
    }

    #[test]
    fn test_log_off_records_nothing() {
        let mut pool = FixedSizePool::with_defaults();
        let _ = pool.allocate(8).unwrap();
        assert!(pool.logs().is_empty());
    }

    #[test]
    fn test_events_below_threshold_are_not_built() {
        let mut pool = FixedSizePool::with_defaults();
        pool.note(PoolLogLevel::Error, "allocate", "alloc", |_| {
            panic!("event built while logging is off")
        });

        let config = PoolConfig::default().with_log_level(PoolLogLevel::Warn);
        let mut pool = FixedSizePool::new(config).unwrap();
        pool.note(PoolLogLevel::Debug, "refill", "refill", |_| {
            panic!("debug event built at warn threshold")
        });
        let mut built = false;
        pool.note(PoolLogLevel::Error, "allocate", "resource_exhausted", |event| {
            built = true;
            event.outcome("failed")
        });
        assert!(built);
        let logs = pool.logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].outcome, "failed");
    }
}
