use poolvec_core::{DynamicArray, PoolConfig, PoolHandle};

#[derive(Clone, Copy, Debug)]
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        // xorshift64*
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    fn gen_range_usize(&mut self, low: usize, high_inclusive: usize) -> usize {
        assert!(low <= high_inclusive);
        let span = high_inclusive - low + 1;
        low + (self.next_u64() as usize % span)
    }
}

#[test]
fn deterministic_array_sequences_match_vec() {
    // Invariant pressure, not a fuzz campaign (that lives in poolvec-fuzz).
    const SEEDS: [u64; 4] = [1, 2, 3, 4];
    const STEPS: usize = 2_000;

    for seed in SEEDS {
        let pool = PoolHandle::new(PoolConfig::default()).unwrap();
        let mut rng = XorShift64::new(seed);
        let mut arr: DynamicArray<u64> = DynamicArray::new_in(pool.clone());
        let mut model: Vec<u64> = Vec::new();

        for step in 0..STEPS {
            let context = format!("seed={seed} step={step}");
            let value = rng.next_u64();
            match rng.gen_range_usize(0, 9) {
                0..=2 => {
                    arr.push_back(value);
                    model.push(value);
                }
                3 => {
                    assert_eq!(arr.pop_back(), model.pop(), "{context}");
                }
                4 => {
                    let index = rng.gen_range_usize(0, model.len());
                    let count = rng.gen_range_usize(0, 12);
                    arr.insert_n(index, count, &value);
                    model.splice(index..index, std::iter::repeat_n(value, count));
                }
                5 if !model.is_empty() => {
                    let start = rng.gen_range_usize(0, model.len() - 1);
                    let end = rng.gen_range_usize(start, model.len());
                    arr.erase(start..end);
                    model.drain(start..end);
                }
                6 => {
                    let before = arr.capacity();
                    let target = rng.gen_range_usize(0, 300);
                    arr.reserve(target);
                    assert!(arr.capacity() >= target.max(before), "{context}: reserve");
                }
                7 => {
                    let new_len = rng.gen_range_usize(0, 150);
                    arr.resize(new_len, value);
                    model.resize(new_len, value);
                }
                8 if step % 97 == 0 => {
                    arr.shrink_to_fit();
                    assert_eq!(arr.capacity(), arr.len(), "{context}: shrink");
                }
                _ => {
                    let index = rng.gen_range_usize(0, model.len());
                    arr.insert(index, value);
                    model.insert(index, value);
                }
            }

            assert!(arr.len() <= arr.capacity(), "{context}: len > capacity");
            assert_eq!(arr.as_slice(), model.as_slice(), "{context}");
        }

        let moved = arr.take();
        assert!(arr.data().is_null(), "seed={seed}");
        assert_eq!(moved.as_slice(), model.as_slice(), "seed={seed}");
        drop(moved);

        let stats = pool.stats();
        assert_eq!(stats.large_live, 0, "seed={seed}: large block leaked");
    }
}

#[test]
fn insert_then_erase_restores_sequence() {
    const SEEDS: [u64; 3] = [11, 22, 33];

    for seed in SEEDS {
        let mut rng = XorShift64::new(seed);
        let pool = PoolHandle::new(PoolConfig::default()).unwrap();
        let original: Vec<String> = (0..rng.gen_range_usize(0, 40))
            .map(|i| format!("item-{i}"))
            .collect();
        let mut arr = DynamicArray::from_slice_in(&original, pool);

        for _ in 0..200 {
            let pos = rng.gen_range_usize(0, arr.len());
            let k = rng.gen_range_usize(0, 20);
            arr.insert_n(pos, k, &"inserted".to_string());
            assert_eq!(arr.len(), original.len() + k);
            arr.erase(pos..pos + k);
            assert_eq!(arr.as_slice(), original.as_slice(), "seed={seed} pos={pos} k={k}");
        }
    }
}

#[test]
fn reserve_preserves_elements_in_order() {
    let pool = PoolHandle::new(PoolConfig::default()).unwrap();
    let mut arr = DynamicArray::new_in(pool);
    for i in 0..17 {
        arr.push_back(format!("{i:02}"));
    }
    let snapshot: Vec<String> = arr.iter().cloned().collect();
    for target in [20, 64, 200, 1000] {
        arr.reserve(target);
        assert!(arr.capacity() >= target);
        assert_eq!(arr.as_slice(), snapshot.as_slice());
    }
}
