//! A fixed-size container indexed modulo its length.
//!
//! Recursions over a circularized sequence can then use plain interval
//! arithmetic (`i + offset`, `j - 1`, `i + n - 1`) as indices.

use std::ops::Index;
use std::ops::IndexMut;

#[derive(Debug, Clone, PartialEq)]
pub struct WrappedVec<T> {
    items: Vec<T>,
}

impl<T: Clone> WrappedVec<T> {
    pub fn new(n: usize, val: T) -> Self {
        debug_assert!(n > 0);
        Self { items: vec![val; n] }
    }
}

impl<T> WrappedVec<T> {
    pub fn from_fn<F: FnMut(usize) -> T>(n: usize, f: F) -> Self {
        debug_assert!(n > 0);
        Self { items: (0..n).map(f).collect() }
    }

    /// Fixed at construction.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, idx: usize) -> &T {
        &self.items[idx % self.items.len()]
    }

    pub fn set(&mut self, idx: usize, val: T) {
        let n = self.items.len();
        self.items[idx % n] = val;
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T> Index<usize> for WrappedVec<T> {
    type Output = T;

    fn index(&self, idx: usize) -> &T {
        self.get(idx)
    }
}

impl<T> IndexMut<usize> for WrappedVec<T> {
    fn index_mut(&mut self, idx: usize) -> &mut T {
        let n = self.items.len();
        &mut self.items[idx % n]
    }
}
