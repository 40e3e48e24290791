use crate::domain::types::Millis;

use super::race_store::StoreError;

/// Items held in a [`RingBuffer`] carry a millisecond timestamp
pub trait TimeStamped {
    fn ts(&self) -> Millis;
}

/// Bounded, overwrite-oldest container for the last N items of one pilot.
///
/// - `push` is O(1); once full, the oldest physical slot is silently
///   overwritten. Losing old data is the intended retention behavior,
///   not an error.
/// - Iteration is in insertion order, oldest first. Insertion order is
///   assumed to be near-chronological but timestamp monotonicity is NOT
///   guaranteed (clients may reorder), so `since` is a linear filter
///   rather than a binary search.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    buf: Vec<Option<T>>,
    capacity: usize,
    // index where the next element will be written
    head: usize,
    filled: usize,
}

impl<T: TimeStamped + Clone> RingBuffer<T> {
    pub fn new(capacity: usize) -> Result<Self, StoreError> {
        if capacity == 0 {
            return Err(StoreError::InvalidCapacity);
        }
        Ok(Self {
            buf: vec![None; capacity],
            capacity,
            head: 0,
            filled: 0,
        })
    }

    /// Inserts an item, overwriting the oldest slot when full
    pub fn push(&mut self, item: T) {
        self.buf[self.head] = Some(item);
        self.head = (self.head + 1) % self.capacity;
        if self.filled < self.capacity {
            self.filled += 1;
        }
    }

    /// Items in insertion order, oldest first
    pub fn to_vec(&self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.filled);
        let start = (self.head + self.capacity - self.filled) % self.capacity;
        for i in 0..self.filled {
            if let Some(item) = &self.buf[(start + i) % self.capacity] {
                out.push(item.clone());
            }
        }
        out
    }

    /// Ordered subsequence of items with `ts >= cutoff`
    pub fn since(&self, cutoff: Millis) -> Vec<T> {
        self.to_vec()
            .into_iter()
            .filter(|item| item.ts() >= cutoff)
            .collect()
    }

    /// Most recently pushed item, if any
    pub fn last(&self) -> Option<T> {
        if self.filled == 0 {
            return None;
        }
        let idx = (self.head + self.capacity - 1) % self.capacity;
        self.buf[idx].clone()
    }

    pub fn len(&self) -> usize {
        self.filled
    }

    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    pub fn is_full(&self) -> bool {
        self.filled == self.capacity
    }
}
