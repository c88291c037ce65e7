//! Core index data: the item slab plus the phrase and token indexes.
//!
//! Every indexed item keeps the exact list of contributions it made, so
//! `unindex` removes precisely what `index` added, even if the underlying item
//! changed in between.

use std::collections::BTreeSet;

use fnv::FnvHashMap;

use crate::config::CasePolicy;
use crate::item::{ItemKey, RemoteFileItem, SharedItem};
use crate::storage::{ItemId, ItemSlab};
use crate::types::{FilePropertyKey, IndexStats, SearchCategory};

use super::fields::{extract_fields, ExtractedField, IndexField};
use super::phrase::PhraseIndex;
use super::token::TokenIndex;
use super::tokenize::{canonicalize, tokenize};

/// An indexed item and the contributions it made.
#[derive(Debug)]
struct IndexedItem {
    item: SharedItem,
    category: SearchCategory,
    /// `(phrase bucket field, phrase as announced)`.
    phrases: Vec<(Option<FilePropertyKey>, String)>,
    /// `(field, canonical token)`.
    tokens: Vec<(IndexField, String)>,
}

/// Runtime index over every currently announced item.
#[derive(Debug, Default)]
pub struct IndexData {
    case_policy: CasePolicy,
    items: ItemSlab<IndexedItem>,
    ids: FnvHashMap<ItemKey, ItemId>,
    phrases: PhraseIndex,
    tokens: TokenIndex,
}

/// The two buckets every contribution lands in.
#[inline]
fn category_buckets(category: SearchCategory) -> [SearchCategory; 2] {
    [category, SearchCategory::All]
}

impl IndexData {
    pub fn new(case_policy: CasePolicy) -> Self {
        Self {
            case_policy,
            ..Self::default()
        }
    }

    pub fn case_policy(&self) -> CasePolicy {
        self.case_policy
    }

    /// Indexes `item` under its category and under `All`.
    ///
    /// Returns false without touching the index if the item is already indexed.
    pub fn index(&mut self, item: &SharedItem) -> bool {
        let key = item.key();
        if self.ids.contains_key(&key) {
            log::debug!("skipping already indexed file {}", item.name());
            return false;
        }

        let category = SearchCategory::for_category(item.category());
        let mut phrases = BTreeSet::new();
        let mut tokens = BTreeSet::new();
        for ExtractedField { field, value } in extract_fields(&**item) {
            for token in tokenize(&value) {
                tokens.insert((field, canonicalize(self.case_policy, token).into_owned()));
            }
            if let Some(property) = field.property() {
                phrases.insert((Some(property), value.clone()));
            }
            phrases.insert((None, value));
        }

        let id = self.items.insert(IndexedItem {
            item: item.clone(),
            category,
            phrases: phrases.into_iter().collect(),
            tokens: tokens.into_iter().collect(),
        });
        self.ids.insert(key, id);

        let record = &self.items[id];
        for (field, phrase) in &record.phrases {
            let canonical = canonicalize(self.case_policy, phrase);
            for bucket in category_buckets(category) {
                self.phrases.insert((*field, bucket), &canonical, phrase);
            }
        }
        for (field, token) in &record.tokens {
            for bucket in category_buckets(category) {
                self.tokens.insert((*field, bucket), token, id);
            }
        }

        log::debug!(
            "indexed file {} category={} phrases={} tokens={}",
            item.name(),
            category.as_str(),
            record.phrases.len(),
            record.tokens.len()
        );
        true
    }

    /// Removes every contribution `item` made. Returns false if it was not indexed.
    pub fn unindex(&mut self, item: &SharedItem) -> bool {
        let Some(id) = self.ids.remove(&item.key()) else {
            return false;
        };
        let Some(record) = self.items.try_remove(id) else {
            log::warn!("index id for file {} had no slab entry", item.name());
            return false;
        };

        for (field, phrase) in &record.phrases {
            let canonical = canonicalize(self.case_policy, phrase);
            for bucket in category_buckets(record.category) {
                self.phrases.remove((*field, bucket), &canonical, phrase);
            }
        }
        for (field, token) in &record.tokens {
            for bucket in category_buckets(record.category) {
                self.tokens.remove((*field, bucket), token, id);
            }
        }

        log::debug!("unindexed file {}", record.item.name());
        true
    }

    pub fn contains(&self, item: &SharedItem) -> bool {
        self.ids.contains_key(&item.key())
    }

    /// Gets the item stored under `id`.
    #[inline]
    pub fn item(&self, id: ItemId) -> Option<&SharedItem> {
        self.items.get(id).map(|record| &record.item)
    }

    /// Iterates every indexed item selected by `category`.
    pub fn items_in(&self, category: SearchCategory) -> impl Iterator<Item = &SharedItem> {
        self.items
            .iter()
            .filter(move |(_, record)| category == SearchCategory::All || record.category == category)
            .map(|(_, record)| &record.item)
    }

    pub(crate) fn phrases(&self) -> &PhraseIndex {
        &self.phrases
    }

    pub(crate) fn tokens(&self) -> &TokenIndex {
        &self.tokens
    }

    /// Index sizes. Topology counters are left at zero.
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            items: self.items.len(),
            phrases: self.phrases.phrase_count(),
            tokens: self.tokens.token_count(),
            ..IndexStats::default()
        }
    }

    /// Returns the number of indexed items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
