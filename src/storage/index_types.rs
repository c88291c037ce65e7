//! Item id types for type-safe posting lists.

use thin_vec::ThinVec;

/// A compact 32-bit id of an indexed item.
///
/// Ids are slab slots and are reused after the item is unindexed, so they are
/// only meaningful while the item stays indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ItemId(u32);

impl ItemId {
    /// Creates a new ItemId from a usize.
    ///
    /// # Panics
    /// Panics if `index >= u32::MAX`.
    #[inline]
    pub fn new(index: usize) -> Self {
        assert!(index < u32::MAX as usize, "item id must be less than u32::MAX");
        Self(index as u32)
    }

    #[inline]
    pub fn get(&self) -> usize {
        self.0 as usize
    }
}

// ---------------------------------------------------------------------------
// SortedItemIds
// ---------------------------------------------------------------------------

/// A sorted, duplicate-free set of item ids backed by a `ThinVec`.
///
/// Empty sets cost a single pointer, which matters because most tokens are
/// contributed by very few items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[repr(transparent)]
pub struct SortedItemIds {
    ids: ThinVec<ItemId>,
}

impl SortedItemIds {
    #[inline]
    pub fn with_single(id: ItemId) -> Self {
        Self {
            ids: ThinVec::from_iter([id]),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &ItemId> {
        self.ids.iter()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    /// Inserts an id in sorted order, returning false if it was already present.
    pub fn insert(&mut self, id: ItemId) -> bool {
        match self.ids.binary_search(&id) {
            Ok(_) => false,
            Err(pos) => {
                self.ids.insert(pos, id);
                true
            }
        }
    }

    /// Removes an id, returning true if it was present.
    pub fn remove(&mut self, id: ItemId) -> bool {
        match self.ids.binary_search(&id) {
            Ok(pos) => {
                self.ids.remove(pos);
                true
            }
            Err(_) => false,
        }
    }
}

impl FromIterator<ItemId> for SortedItemIds {
    fn from_iter<I: IntoIterator<Item = ItemId>>(iter: I) -> Self {
        let mut ids = iter.into_iter().collect::<Vec<_>>();
        ids.sort_unstable();
        ids.dedup();
        Self {
            ids: ThinVec::from_iter(ids),
        }
    }
}
