//! Heap-backed slab allocator for indexed items.
//!
//! Slots freed by removal are threaded onto a freelist and reused by later
//! inserts, so item ids stay small under continuous churn.

use std::ops::Index;

use super::entry::Entry;
use super::index_types::ItemId;

#[derive(Debug)]
pub struct ItemSlab<T> {
    entries: Vec<Entry<T>>,

    /// Logical element count (occupied slots only).
    len: usize,

    /// Head of the freelist (index of the next available slot).
    next: usize,
}

impl<T> Default for ItemSlab<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ItemSlab<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            len: 0,
            next: 0,
        }
    }

    /// Inserts a value, returning its id.
    pub fn insert(&mut self, value: T) -> ItemId {
        let key = self.next;
        if key == self.entries.len() {
            self.entries.push(Entry::Occupied(value));
            self.next = self.entries.len();
        } else {
            let next_free = match self.entries[key] {
                Entry::Vacant(next) => next,
                Entry::Occupied(_) => unreachable!("freelist slot unexpectedly occupied"),
            };
            self.entries[key] = Entry::Occupied(value);
            self.next = next_free;
        }
        self.len += 1;
        ItemId::new(key)
    }

    pub fn get(&self, id: ItemId) -> Option<&T> {
        match self.entries.get(id.get()) {
            Some(Entry::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    /// Removes the value at `id`, returning it if present.
    pub fn try_remove(&mut self, id: ItemId) -> Option<T> {
        let key = id.get();
        let entry = self.entries.get_mut(key)?;
        if matches!(entry, Entry::Vacant(_)) {
            return None;
        }
        let previous = std::mem::replace(entry, Entry::Vacant(self.next));
        self.next = key;
        self.len -= 1;
        match previous {
            Entry::Occupied(value) => Some(value),
            Entry::Vacant(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns an iterator over occupied entries.
    pub fn iter(&self) -> ItemSlabIter<'_, T> {
        ItemSlabIter {
            inner: self.entries.iter().enumerate(),
        }
    }
}

impl<T> Index<ItemId> for ItemSlab<T> {
    type Output = T;

    fn index(&self, id: ItemId) -> &Self::Output {
        self.get(id).expect("slab slot must be occupied")
    }
}

/// Iterator over occupied entries in an [`ItemSlab`].
pub struct ItemSlabIter<'a, T> {
    inner: std::iter::Enumerate<std::slice::Iter<'a, Entry<T>>>,
}

impl<'a, T> Iterator for ItemSlabIter<'a, T> {
    type Item = (ItemId, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        for (index, entry) in self.inner.by_ref() {
            if let Entry::Occupied(value) = entry {
                return Some((ItemId::new(index), value));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_operations() {
        let mut slab = ItemSlab::<i32>::new();
        assert!(slab.is_empty());

        let id = slab.insert(42);
        assert_eq!(slab.get(id), Some(&42));
        assert_eq!(slab[id], 42);
        assert_eq!(slab.len(), 1);

        assert_eq!(slab.try_remove(id), Some(42));
        assert_eq!(slab.try_remove(id), None);
        assert!(slab.is_empty());
    }

    #[test]
    fn freed_slots_are_reused() {
        let mut slab = ItemSlab::new();
        let a = slab.insert("a");
        let b = slab.insert("b");
        let c = slab.insert("c");

        slab.try_remove(b);
        slab.try_remove(a);

        // Most recently freed slot comes back first.
        assert_eq!(slab.insert("d"), a);
        assert_eq!(slab.insert("e"), b);
        assert_eq!(slab.insert("f").get(), 3);
        assert_eq!(slab[c], "c");
        assert_eq!(slab.len(), 4);
    }

    #[test]
    fn iter_skips_vacant_slots() {
        let mut slab = ItemSlab::new();
        let a = slab.insert(1);
        let b = slab.insert(2);
        let c = slab.insert(3);
        slab.try_remove(b);

        let live: Vec<_> = slab.iter().map(|(id, value)| (id, *value)).collect();
        assert_eq!(live, vec![(a, 1), (c, 3)]);

        slab.try_remove(a);
        slab.try_remove(c);
        assert!(slab.is_empty());
        assert_eq!(slab.iter().count(), 0);
    }
}
