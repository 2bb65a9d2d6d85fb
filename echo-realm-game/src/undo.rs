//! Bounded LIFO of pre-mutation snapshots.
use std::collections::VecDeque;

use crate::constants::UNDO_CAPACITY;

/// Undo stack that forgets its oldest snapshot once `capacity` is exceeded.
#[derive(Debug, Clone)]
pub struct UndoStack<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> Default for UndoStack<T> {
    fn default() -> Self {
        Self::with_capacity(UNDO_CAPACITY)
    }
}

impl<T> UndoStack<T> {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, snapshot: T) {
        self.items.push_back(snapshot);
        while self.items.len() > self.capacity {
            self.items.pop_front();
        }
    }

    pub fn pop(&mut self) -> Option<T> {
        self.items.pop_back()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.items.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oldest_snapshot_is_evicted() {
        let mut stack = UndoStack::with_capacity(2);
        stack.push(1);
        stack.push(2);
        stack.push(3);
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.pop(), Some(3));
        assert_eq!(stack.pop(), Some(2));
        assert_eq!(stack.pop(), None);
        assert!(!stack.can_undo());
    }

    #[test]
    fn default_capacity_is_ten() {
        let mut stack = UndoStack::default();
        for i in 0..15 {
            stack.push(i);
        }
        assert_eq!(stack.len(), 10);
        stack.clear();
        assert!(stack.is_empty());
    }
}
