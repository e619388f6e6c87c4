#![no_main]
use libfuzzer_sys::fuzz_target;
use poolvec_pool::{FixedSizePool, PoolConfig};

fuzz_target!(|data: &[u8]| {
    // Ops are 4-byte records: [op, size_lo, size_hi, fill].
    let config = PoolConfig::default()
        .with_heap_limit(64 * 1024)
        .with_refill_objects(1 + usize::from(data.first().copied().unwrap_or(0) % 32));
    let Ok(mut pool) = FixedSizePool::new(config) else {
        return;
    };
    let mut live: Vec<(*mut u8, usize, u8)> = Vec::new();

    for chunk in data.chunks_exact(4) {
        let size = usize::from(u16::from_le_bytes([chunk[1], chunk[2]]) % 512);
        match chunk[0] % 3 {
            0 => {
                if let Ok(ptr) = pool.allocate(size) {
                    let ptr = ptr.as_ptr();
                    // SAFETY: the block holds at least `size` bytes.
                    unsafe { ptr.write_bytes(chunk[3], size) };
                    live.push((ptr, size, chunk[3]));
                }
            }
            1 => {
                if !live.is_empty() {
                    let (ptr, size, fill) = live.swap_remove(usize::from(chunk[3]) % live.len());
                    for i in 0..size {
                        // SAFETY: in bounds of a live block.
                        assert_eq!(unsafe { *ptr.add(i) }, fill, "block overwritten");
                    }
                    // SAFETY: `ptr` is live and was requested with `size`.
                    unsafe { pool.deallocate(std::ptr::NonNull::new_unchecked(ptr), size) };
                }
            }
            _ => {
                let stats = pool.stats();
                assert!(stats.arena_remaining <= stats.heap_size);
            }
        }
    }

    for (ptr, size, fill) in live {
        for i in 0..size {
            // SAFETY: in bounds of a live block.
            assert_eq!(unsafe { *ptr.add(i) }, fill, "block overwritten");
        }
        // SAFETY: as above.
        unsafe { pool.deallocate(std::ptr::NonNull::new_unchecked(ptr), size) };
    }
});
