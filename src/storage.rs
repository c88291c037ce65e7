//! Storage primitives for indexed items.
//!
//! - Heap-backed slab handing out compact, reusable item ids
//! - Sorted, memory-compact id sets used as posting lists

mod entry;
mod index_types;
mod slab;

pub use index_types::{ItemId, SortedItemIds};
pub use slab::{ItemSlab, ItemSlabIter};
