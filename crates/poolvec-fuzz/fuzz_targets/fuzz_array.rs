#![no_main]
use libfuzzer_sys::fuzz_target;
use poolvec_core::{DynamicArray, PoolConfig, PoolHandle};

fuzz_target!(|data: &[u8]| {
    let Ok(pool) = PoolHandle::new(PoolConfig::default()) else {
        return;
    };
    let mut array: DynamicArray<String> = DynamicArray::new_in(pool);
    let mut reference: Vec<String> = Vec::new();

    for chunk in data.chunks_exact(3) {
        let a = usize::from(chunk[1]);
        let b = usize::from(chunk[2]);
        let len = reference.len();
        match chunk[0] % 8 {
            0 => {
                array.push_back(a.to_string());
                reference.push(a.to_string());
            }
            1 => {
                assert_eq!(array.pop_back(), reference.pop());
            }
            2 => {
                let index = a % (len + 1);
                array.insert(index, b.to_string());
                reference.insert(index, b.to_string());
            }
            3 if len > 0 => {
                let index = a % len;
                assert_eq!(array.erase_at(index), reference.remove(index));
            }
            4 => {
                let start = a % (len + 1);
                let end = start + b % (len - start + 1);
                array.erase(start..end);
                reference.drain(start..end);
            }
            5 => {
                let index = a % (len + 1);
                let count = b % 16;
                let value = String::from("n");
                array.insert_n(index, count, &value);
                reference.splice(index..index, std::iter::repeat_n(value, count));
            }
            6 => {
                let new_len = a % 64;
                array.resize(new_len, b.to_string());
                reference.resize(new_len, b.to_string());
            }
            _ => {
                let before = array.capacity();
                array.reserve(a);
                assert!(array.capacity() >= before.max(a));
            }
        }
        assert!(array.len() <= array.capacity());
        assert_eq!(array.as_slice(), reference.as_slice());
    }
});
