//! Read-only queries over the result index.
//!
//! - `suggest` - Prefix completion against the phrase index
//! - `matcher` - Keyword, category and per-field matching against the token index
//!
//! Both are pure reads of an [`IndexData`](crate::index::IndexData) snapshot.

mod matcher;
mod suggest;

pub use matcher::matching_items;
pub use suggest::suggestions;
