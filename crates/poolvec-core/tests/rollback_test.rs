use poolvec_core::{DynamicArray, PoolConfig, PoolHandle, element};
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

/// Shared bookkeeping: live instance count and how many more clones may
/// succeed before `clone()` panics.
#[derive(Clone, Default)]
struct Ledger {
    live: Rc<Cell<isize>>,
    clone_budget: Rc<Cell<usize>>,
}

impl Ledger {
    fn new() -> Self {
        let ledger = Self::default();
        ledger.clone_budget.set(usize::MAX);
        ledger
    }

    fn make(&self, id: u32) -> Tracked {
        self.live.set(self.live.get() + 1);
        Tracked {
            ledger: self.clone(),
            id,
        }
    }

    fn live(&self) -> isize {
        self.live.get()
    }

    fn allow_clones(&self, n: usize) {
        self.clone_budget.set(n);
    }
}

struct Tracked {
    ledger: Ledger,
    id: u32,
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        let left = self.ledger.clone_budget.get();
        if left == 0 {
            panic!("clone refused");
        }
        self.ledger.clone_budget.set(left - 1);
        self.ledger.make(self.id)
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.ledger.live.set(self.ledger.live.get() - 1);
    }
}

element!(Tracked);

fn ids(arr: &DynamicArray<Tracked>) -> Vec<u32> {
    arr.iter().map(|t| t.id).collect()
}

fn pool() -> PoolHandle {
    PoolHandle::new(PoolConfig::default()).unwrap()
}

fn filled(ledger: &Ledger, n: u32, capacity: usize) -> DynamicArray<Tracked> {
    let mut arr = DynamicArray::with_capacity_in(capacity, pool());
    for id in 0..n {
        arr.push_back(ledger.make(id));
    }
    arr
}

#[test]
fn in_place_insert_failure_restores_tail() {
    let ledger = Ledger::new();
    let mut arr = filled(&ledger, 4, 10);
    let proto = ledger.make(99);
    let data = arr.data();

    ledger.allow_clones(1);
    let result = panic::catch_unwind(AssertUnwindSafe(|| arr.insert_n(2, 3, &proto)));
    assert!(result.is_err());

    assert_eq!(ids(&arr), vec![0, 1, 2, 3]);
    assert_eq!(arr.capacity(), 10);
    assert_eq!(arr.data(), data);
    assert_eq!(ledger.live(), 5);
}

#[test]
fn growing_insert_failure_keeps_old_buffer() {
    let ledger = Ledger::new();
    let mut arr = filled(&ledger, 4, 4);
    let proto = ledger.make(99);
    let data = arr.data();
    let before = arr.pool().stats();

    ledger.allow_clones(2);
    let result = panic::catch_unwind(AssertUnwindSafe(|| arr.insert_n(1, 5, &proto)));
    assert!(result.is_err());

    assert_eq!(ids(&arr), vec![0, 1, 2, 3]);
    assert_eq!(arr.capacity(), 4);
    assert_eq!(arr.data(), data);
    assert_eq!(ledger.live(), 5);
    // The replacement buffer went back to where it came from.
    let after = arr.pool().stats();
    assert_eq!(after.large_live, before.large_live);
    assert_eq!(after.system_bytes_outstanding, before.system_bytes_outstanding);

    // The array is still fully usable.
    ledger.allow_clones(usize::MAX);
    arr.insert_n(1, 5, &proto);
    assert_eq!(ids(&arr), vec![0, 99, 99, 99, 99, 99, 1, 2, 3]);
    assert_eq!(arr.capacity(), 9);
}

#[test]
fn clone_failure_leaks_nothing() {
    let ledger = Ledger::new();
    let arr = filled(&ledger, 5, 5);

    ledger.allow_clones(3);
    let result = panic::catch_unwind(AssertUnwindSafe(|| arr.clone()));
    assert!(result.is_err());
    assert_eq!(ledger.live(), 5);

    drop(arr);
    assert_eq!(ledger.live(), 0);
}

#[test]
fn resize_with_failure_keeps_length() {
    let ledger = Ledger::new();
    let mut arr = filled(&ledger, 2, 8);
    let mut built = 0;

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        arr.resize_with(6, || {
            built += 1;
            if built == 3 {
                panic!("constructor failed");
            }
            ledger.make(built)
        })
    }));
    assert!(result.is_err());
    assert_eq!(arr.len(), 2);
    assert_eq!(ledger.live(), 2);
}

#[test]
fn emplace_failure_never_touches_storage() {
    let mut arr: DynamicArray<Tracked> = DynamicArray::new_in(pool());
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        arr.emplace_back(|| panic!("constructor failed"));
    }));
    assert!(result.is_err());
    assert!(arr.data().is_null());
    assert_eq!(arr.capacity(), 0);
    assert_eq!(arr.pool().stats().refills, 0);
}

#[test]
fn assign_slice_failure_leaves_array_empty_not_corrupt() {
    let ledger = Ledger::new();
    let mut arr = filled(&ledger, 3, 3);
    let src: Vec<_> = (10..14).map(|id| ledger.make(id)).collect();

    ledger.allow_clones(2);
    let result = panic::catch_unwind(AssertUnwindSafe(|| arr.assign_slice(&src)));
    assert!(result.is_err());
    // Old contents were dropped before the copy started.
    assert!(arr.is_empty());
    assert_eq!(ledger.live(), 4);
}

#[test]
fn erase_and_into_iter_drop_exactly_once() {
    let ledger = Ledger::new();
    let mut arr = filled(&ledger, 10, 10);
    arr.erase(2..6);
    assert_eq!(ids(&arr), vec![0, 1, 6, 7, 8, 9]);
    assert_eq!(ledger.live(), 6);

    let removed = arr.erase_at(0);
    assert_eq!(removed.id, 0);
    drop(removed);
    assert_eq!(ledger.live(), 5);

    let mut iter = arr.into_iter();
    let first = iter.next().unwrap();
    assert_eq!(first.id, 1);
    drop(iter);
    assert_eq!(ledger.live(), 1);
    drop(first);
    assert_eq!(ledger.live(), 0);
}
