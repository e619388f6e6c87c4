//! Inline fixed-size array with checked access.

use std::ops::{Index, IndexMut};
use std::ptr;

use crate::error::ArrayError;

/// `N` values stored inline. No pool involvement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FixedArray<T, const N: usize> {
    elems: [T; N],
}

impl<T: Default, const N: usize> FixedArray<T, N> {
    /// Every slot default-constructed.
    pub fn new() -> Self {
        Self {
            elems: std::array::from_fn(|_| T::default()),
        }
    }
}

impl<T: Default, const N: usize> Default for FixedArray<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> FixedArray<T, N> {
    pub const fn from_array(elems: [T; N]) -> Self {
        Self { elems }
    }

    pub fn into_array(self) -> [T; N] {
        self.elems
    }

    pub const fn size(&self) -> usize {
        N
    }

    pub const fn max_size(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    pub fn at(&self, index: usize) -> Result<&T, ArrayError> {
        self.elems
            .get(index)
            .ok_or(ArrayError::OutOfBounds { index, len: N })
    }

    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, ArrayError> {
        self.elems
            .get_mut(index)
            .ok_or(ArrayError::OutOfBounds { index, len: N })
    }

    /// Element `I`, bounds-checked at compile time.
    pub fn get<const I: usize>(&self) -> &T {
        const { assert!(I < N, "FixedArray::get index out of bounds") };
        &self.elems[I]
    }

    pub fn get_mut<const I: usize>(&mut self) -> &mut T {
        const { assert!(I < N, "FixedArray::get_mut index out of bounds") };
        &mut self.elems[I]
    }

    pub fn front(&self) -> Option<&T> {
        self.elems.first()
    }

    pub fn back(&self) -> Option<&T> {
        self.elems.last()
    }

    /// Start of the storage, or null for `N == 0`.
    pub fn data(&self) -> *const T {
        if N == 0 {
            ptr::null()
        } else {
            self.elems.as_ptr()
        }
    }

    pub fn as_slice(&self) -> &[T] {
        &self.elems
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.elems
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.elems.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.elems.iter_mut()
    }

    pub fn fill(&mut self, value: &T)
    where
        T: Clone,
    {
        self.elems.fill(value.clone());
    }

    /// Exchanges contents element by element.
    pub fn swap(&mut self, other: &mut Self) {
        self.elems.swap_with_slice(&mut other.elems);
    }
}

impl<T, const N: usize> From<[T; N]> for FixedArray<T, N> {
    fn from(elems: [T; N]) -> Self {
        Self { elems }
    }
}

impl<T, const N: usize> Index<usize> for FixedArray<T, N> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.elems[index]
    }
}

impl<T, const N: usize> IndexMut<usize> for FixedArray<T, N> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.elems[index]
    }
}

impl<T, const N: usize> IntoIterator for FixedArray<T, N> {
    type Item = T;
    type IntoIter = std::array::IntoIter<T, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.elems.into_iter()
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a FixedArray<T, N> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elems.iter()
    }
}
