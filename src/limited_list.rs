//! A list with a fixed maximum length
//!
//! Several records store small index lists as a fixed number of slots
//! plus a separate "used" count. [`LimitedList`] holds only the used
//! elements and refuses to grow past the slot count.

use std::ops::{Deref, Index};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct LimitedList<T> {
    capacity: usize,
    items: Vec<T>,
}

impl<T> LimitedList<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: Vec::with_capacity(capacity),
        }
    }

    /// Build a list from existing items.
    ///
    /// Fails with [`Error::CapacityExceeded`] if `items` is longer than
    /// `capacity`.
    pub fn from_slice(capacity: usize, items: &[T]) -> Result<Self>
    where
        T: Clone,
    {
        if items.len() > capacity {
            return Err(Error::CapacityExceeded { capacity });
        }
        Ok(Self {
            capacity,
            items: items.to_vec(),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    pub fn push(&mut self, item: T) -> Result<()> {
        if self.is_full() {
            return Err(Error::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        self.items.push(item);
        Ok(())
    }

    pub fn insert(&mut self, index: usize, item: T) -> Result<()> {
        if self.is_full() {
            return Err(Error::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        self.items.insert(index, item);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> T {
        self.items.remove(index)
    }

    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }
}

impl<T> Deref for LimitedList<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T> Index<usize> for LimitedList<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<'a, T> IntoIterator for &'a LimitedList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
