//! Token index backing keyword matching.
//!
//! Each `(field, category)` bucket maps a whitespace-split token to the sorted
//! set of items that contributed it. General matching unions the buckets of
//! every field; per-field matching reads a single field's bucket.

use std::collections::BTreeMap;
use std::ops::Bound;

use fnv::FnvHashMap;

use crate::storage::{ItemId, SortedItemIds};
use crate::types::SearchCategory;

use super::fields::IndexField;

pub type TokenBucketKey = (IndexField, SearchCategory);

#[derive(Debug, Default)]
pub struct TokenIndex {
    buckets: FnvHashMap<TokenBucketKey, BTreeMap<String, SortedItemIds>>,
}

impl TokenIndex {
    /// Records that `id` contributed `token` to `key`. Returns false if it
    /// was already recorded.
    pub fn insert(&mut self, key: TokenBucketKey, token: &str, id: ItemId) -> bool {
        let tokens = self.buckets.entry(key).or_default();
        match tokens.get_mut(token) {
            Some(ids) => ids.insert(id),
            None => {
                tokens.insert(token.to_string(), SortedItemIds::with_single(id));
                true
            }
        }
    }

    /// Removes `id` from `token` in `key`, pruning empty entries.
    pub fn remove(&mut self, key: TokenBucketKey, token: &str, id: ItemId) -> bool {
        let Some(tokens) = self.buckets.get_mut(&key) else {
            return false;
        };
        let Some(ids) = tokens.get_mut(token) else {
            return false;
        };
        if !ids.remove(id) {
            return false;
        }
        if ids.is_empty() {
            tokens.remove(token);
            if tokens.is_empty() {
                self.buckets.remove(&key);
            }
        }
        true
    }

    /// Iterates the id sets of every token in `key` starting with `prefix`.
    pub fn prefixed<'a>(
        &'a self,
        key: TokenBucketKey,
        prefix: &'a str,
    ) -> impl Iterator<Item = &'a SortedItemIds> + 'a {
        self.buckets
            .get(&key)
            .into_iter()
            .flat_map(move |tokens| {
                tokens
                    .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
                    .take_while(move |(token, _)| token.starts_with(prefix))
                    .map(|(_, ids)| ids)
            })
    }

    /// Number of distinct tokens summed over every bucket.
    pub fn token_count(&self) -> usize {
        self.buckets.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
