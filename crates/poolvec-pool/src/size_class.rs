//! Size class arithmetic for the free-list buckets.
//!
//! Bucket `i` holds blocks of `(i + 1) * align` bytes, so with the default
//! config the classes are 8, 16, 24, ..., 128.

/// Bucket layout derived from a validated config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeClassTable {
    align: usize,
    max_block: usize,
}

impl SizeClassTable {
    /// `align` must be a power of two and `max_block` a multiple of it.
    pub const fn new(align: usize, max_block: usize) -> Self {
        Self { align, max_block }
    }

    pub const fn align(&self) -> usize {
        self.align
    }

    pub const fn max_block(&self) -> usize {
        self.max_block
    }

    /// Number of buckets.
    pub const fn len(&self) -> usize {
        self.max_block / self.align
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rounds `bytes` up to a multiple of `align`. Zero rounds to one unit.
    pub const fn round_up(&self, bytes: usize) -> usize {
        let bytes = if bytes == 0 { 1 } else { bytes };
        (bytes + self.align - 1) & !(self.align - 1)
    }

    /// Returns true if `bytes` is served by the free lists.
    pub const fn is_small(&self, bytes: usize) -> bool {
        bytes <= self.max_block
    }

    /// Bucket index for a request of `bytes` (must be `<= max_block`).
    pub const fn index(&self, bytes: usize) -> usize {
        self.round_up(bytes) / self.align - 1
    }

    /// Block size held by bucket `index`.
    pub const fn block_size(&self, index: usize) -> usize {
        (index + 1) * self.align
    }

    /// Block sizes from `from` (rounded) up to `max_block`, ascending.
    pub fn sizes_from(&self, from: usize) -> impl Iterator<Item = usize> + use<> {
        let start = self.round_up(from);
        let (align, max_block) = (self.align, self.max_block);
        (start..=max_block).step_by(align)
    }
}
