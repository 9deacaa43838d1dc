use std::cmp::Ordering;

/// A binary min-heap ordered by an injected comparator. Unlike [std::collections::BinaryHeap]
/// it supports re-sifting an element whose priority changed while it sat in the heap, which is
/// what the open set needs when a cheaper route to an open node is found.
///
/// Sifting follows the classic heapq layout: popping sinks the hole to a leaf (preferring the
/// right child on ties) and bubbles the moved element back up. This fixes the order in which
/// equal priorities leave the heap.
pub struct BinaryHeap<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    items: Vec<T>,
    cmp: C,
}

impl<T, C> BinaryHeap<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    pub fn new(cmp: C) -> BinaryHeap<T, C> {
        BinaryHeap {
            items: Vec::new(),
            cmp,
        }
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
        let last = self.items.len() - 1;
        self.bubble_up(0, last);
    }

    /// Removes and returns the smallest element.
    pub fn pop(&mut self) -> Option<T> {
        let last = self.items.pop()?;
        if self.items.is_empty() {
            return Some(last);
        }
        let top = std::mem::replace(&mut self.items[0], last);
        self.sink(0);
        Some(top)
    }

    pub fn peek(&self) -> Option<&T> {
        self.items.first()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Moves `item` from `pos` towards the root while it is smaller than its parent, never
    /// past `start`.
    fn bubble_up(&mut self, start: usize, mut pos: usize) {
        while pos > start {
            let parent = (pos - 1) >> 1;
            if (self.cmp)(&self.items[pos], &self.items[parent]) == Ordering::Less {
                self.items.swap(pos, parent);
                pos = parent;
            } else {
                break;
            }
        }
    }

    /// Sinks the element at `pos` down to a leaf along the smaller children, then lets it
    /// bubble back up to its rightful place.
    fn sink(&mut self, mut pos: usize) {
        let end = self.items.len();
        let start = pos;
        let mut child = 2 * pos + 1;
        while child < end {
            let right = child + 1;
            if right < end
                && (self.cmp)(&self.items[child], &self.items[right]) != Ordering::Less
            {
                child = right;
            }
            self.items.swap(pos, child);
            pos = child;
            child = 2 * pos + 1;
        }
        self.bubble_up(start, pos);
    }
}

impl<T, C> BinaryHeap<T, C>
where
    T: PartialEq,
    C: Fn(&T, &T) -> Ordering,
{
    pub fn contains(&self, item: &T) -> bool {
        self.items.contains(item)
    }

    /// Replaces the element equal to `item` with `item` and restores the heap order around it.
    /// Returns false if no such element is in the heap.
    pub fn update_item(&mut self, item: T) -> bool {
        match self.items.iter().position(|x| *x == item) {
            Some(pos) => {
                self.items[pos] = item;
                self.bubble_up(0, pos);
                self.sink(pos);
                true
            }
            None => false,
        }
    }
}
