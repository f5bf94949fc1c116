//! Tagged value cells and reference-counted heap storage.
//!
//! A `Cell` is the runtime representation of one variable's value. Scalar
//! values live inline; string values live on the heap behind an explicit
//! reference count. The retain/release contract is part of the external
//! behavior generated programs are specified against, so it is an explicit
//! API here rather than a lean on the host language's ownership.

use crate::error::RuntimeError;

/// Index of a heap slot.
pub type HeapId = usize;

/// A tagged runtime value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    Int(i64),
    Float(f64),
    /// Owned handle to a heap-backed string (counted).
    Str(HeapId),
    /// Reference to another cell's heap storage (counted).
    Ref(HeapId),
}

impl Cell {
    /// The type tag name for diagnostics.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Cell::Int(_) => "int",
            Cell::Float(_) => "float",
            Cell::Str(_) => "str",
            Cell::Ref(_) => "ref",
        }
    }

    /// The heap slot this cell holds, if it is heap-backed.
    pub fn heap_id(&self) -> Option<HeapId> {
        match self {
            Cell::Str(id) | Cell::Ref(id) => Some(*id),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct HeapEntry {
    value: String,
    count: usize,
}

/// Slotted heap storage with explicit reference counting.
///
/// Invariants: a slot's count is always >= 1 while live; storage is freed
/// exactly once, when the count transitions to zero. Operating on a freed
/// slot is a programming error in the generated program, surfaced as
/// `HeapSlotFreed`.
#[derive(Debug, Default)]
pub struct Heap {
    slots: Vec<Option<HeapEntry>>,
    freed: usize,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new string entry with a count of one.
    pub fn alloc(&mut self, value: String) -> HeapId {
        let entry = HeapEntry { value, count: 1 };
        // Reuse the first freed slot if any.
        if let Some(idx) = self.slots.iter().position(|s| s.is_none()) {
            self.slots[idx] = Some(entry);
            idx
        } else {
            self.slots.push(Some(entry));
            self.slots.len() - 1
        }
    }

    fn entry(&self, id: HeapId) -> Result<&HeapEntry, RuntimeError> {
        self.slots
            .get(id)
            .and_then(|s| s.as_ref())
            .ok_or(RuntimeError::HeapSlotFreed { id })
    }

    /// Read the string stored in a slot.
    pub fn get(&self, id: HeapId) -> Result<&str, RuntimeError> {
        Ok(&self.entry(id)?.value)
    }

    /// Increment a slot's reference count.
    pub fn retain(&mut self, id: HeapId) -> Result<(), RuntimeError> {
        match self.slots.get_mut(id).and_then(|s| s.as_mut()) {
            Some(entry) => {
                entry.count += 1;
                Ok(())
            }
            None => Err(RuntimeError::HeapSlotFreed { id }),
        }
    }

    /// Decrement a slot's reference count, freeing the storage when the
    /// count reaches zero.
    pub fn release(&mut self, id: HeapId) -> Result<(), RuntimeError> {
        match self.slots.get_mut(id).and_then(|s| s.as_mut()) {
            Some(entry) => {
                entry.count -= 1;
                if entry.count == 0 {
                    self.slots[id] = None;
                    self.freed += 1;
                }
                Ok(())
            }
            None => Err(RuntimeError::HeapSlotFreed { id }),
        }
    }

    /// Current reference count of a slot, or `None` if freed.
    pub fn ref_count(&self, id: HeapId) -> Option<usize> {
        self.slots.get(id).and_then(|s| s.as_ref()).map(|e| e.count)
    }

    /// True while the slot's storage has not been freed.
    pub fn is_live(&self, id: HeapId) -> bool {
        self.ref_count(id).is_some()
    }

    /// Total number of slots freed so far.
    pub fn freed_count(&self) -> usize {
        self.freed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_starts_at_one() {
        let mut heap = Heap::new();
        let id = heap.alloc("hello".to_string());
        assert_eq!(heap.ref_count(id), Some(1));
        assert_eq!(heap.get(id).unwrap(), "hello");
    }

    #[test]
    fn test_retain_release_round_trip() {
        let mut heap = Heap::new();
        let id = heap.alloc("shared".to_string());
        heap.retain(id).unwrap();
        assert_eq!(heap.ref_count(id), Some(2));

        heap.release(id).unwrap();
        assert_eq!(heap.ref_count(id), Some(1));
        assert!(heap.is_live(id));
        assert_eq!(heap.freed_count(), 0);

        heap.release(id).unwrap();
        assert!(!heap.is_live(id));
        assert_eq!(heap.freed_count(), 1);
    }

    #[test]
    fn test_release_after_free_is_error() {
        let mut heap = Heap::new();
        let id = heap.alloc("x".to_string());
        heap.release(id).unwrap();
        assert_eq!(heap.release(id), Err(RuntimeError::HeapSlotFreed { id }));
        assert_eq!(heap.retain(id), Err(RuntimeError::HeapSlotFreed { id }));
        // Freed exactly once.
        assert_eq!(heap.freed_count(), 1);
    }

    #[test]
    fn test_freed_slot_reused() {
        let mut heap = Heap::new();
        let a = heap.alloc("a".to_string());
        heap.release(a).unwrap();
        let b = heap.alloc("b".to_string());
        assert_eq!(a, b);
        assert_eq!(heap.get(b).unwrap(), "b");
    }

    #[test]
    fn test_cell_heap_id() {
        assert_eq!(Cell::Int(1).heap_id(), None);
        assert_eq!(Cell::Str(3).heap_id(), Some(3));
        assert_eq!(Cell::Ref(7).heap_id(), Some(7));
        assert_eq!(Cell::Float(1.0).type_tag(), "float");
    }
}
