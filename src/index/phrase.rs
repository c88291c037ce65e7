//! Phrase index backing suggestions.
//!
//! Whole, unsplit values are kept per `(field, category)` bucket. A phrase
//! stays in a bucket while at least one indexed item contributes it.

use std::collections::BTreeMap;
use std::ops::Bound;

use fnv::FnvHashMap;

use crate::types::{FilePropertyKey, SearchCategory};

/// `None` is the general bucket, holding names and every indexable value.
pub type PhraseBucketKey = (Option<FilePropertyKey>, SearchCategory);

#[derive(Debug, Default)]
struct PhraseBucket {
    /// Canonical phrase to the spellings stored under it, each with the
    /// number of items contributing that spelling.
    phrases: BTreeMap<String, BTreeMap<String, usize>>,
}

#[derive(Debug, Default)]
pub struct PhraseIndex {
    buckets: FnvHashMap<PhraseBucketKey, PhraseBucket>,
}

impl PhraseIndex {
    /// Adds one reference to `phrase` (keyed by `canonical`) in `key`.
    pub fn insert(&mut self, key: PhraseBucketKey, canonical: &str, phrase: &str) {
        let forms = self
            .buckets
            .entry(key)
            .or_default()
            .phrases
            .entry(canonical.to_string())
            .or_default();
        *forms.entry(phrase.to_string()).or_insert(0) += 1;
    }

    /// Drops one reference to `phrase`, pruning entries that reach zero.
    ///
    /// Returns false if the phrase was not present.
    pub fn remove(&mut self, key: PhraseBucketKey, canonical: &str, phrase: &str) -> bool {
        let Some(bucket) = self.buckets.get_mut(&key) else {
            return false;
        };
        let Some(forms) = bucket.phrases.get_mut(canonical) else {
            return false;
        };
        let Some(count) = forms.get_mut(phrase) else {
            return false;
        };

        *count -= 1;
        if *count == 0 {
            forms.remove(phrase);
            if forms.is_empty() {
                bucket.phrases.remove(canonical);
                if bucket.phrases.is_empty() {
                    self.buckets.remove(&key);
                }
            }
        }
        true
    }

    /// Iterates the phrases in `key` whose canonical form starts with `prefix`.
    pub fn prefixed<'a>(
        &'a self,
        key: PhraseBucketKey,
        prefix: &'a str,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.buckets
            .get(&key)
            .into_iter()
            .flat_map(move |bucket| {
                bucket
                    .phrases
                    .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
                    .take_while(move |(canonical, _)| canonical.starts_with(prefix))
            })
            .flat_map(|(_, forms)| forms.keys().map(String::as_str))
    }

    /// Number of distinct phrases summed over every bucket.
    pub fn phrase_count(&self) -> usize {
        self.buckets
            .values()
            .flat_map(|bucket| bucket.phrases.values())
            .map(BTreeMap::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENERAL_AUDIO: PhraseBucketKey = (None, SearchCategory::Audio);

    fn collect(index: &PhraseIndex, key: PhraseBucketKey, prefix: &str) -> Vec<String> {
        index.prefixed(key, prefix).map(str::to_string).collect()
    }

    #[test]
    fn prefix_lookup_is_bounded_to_bucket() {
        let mut index = PhraseIndex::default();
        index.insert(GENERAL_AUDIO, "name1", "name1");
        index.insert(GENERAL_AUDIO, "nameo", "nameo");
        index.insert(GENERAL_AUDIO, "other", "other");
        index.insert((None, SearchCategory::Document), "name2", "name2");

        assert_eq!(collect(&index, GENERAL_AUDIO, "name"), vec!["name1", "nameo"]);
        assert_eq!(collect(&index, GENERAL_AUDIO, ""), vec!["name1", "nameo", "other"]);
        assert!(collect(&index, (None, SearchCategory::Video), "").is_empty());
    }

    #[test]
    fn removal_is_reference_counted() {
        let mut index = PhraseIndex::default();
        index.insert(GENERAL_AUDIO, "shared", "shared");
        index.insert(GENERAL_AUDIO, "shared", "shared");

        assert!(index.remove(GENERAL_AUDIO, "shared", "shared"));
        assert_eq!(collect(&index, GENERAL_AUDIO, "sh"), vec!["shared"]);

        assert!(index.remove(GENERAL_AUDIO, "shared", "shared"));
        assert!(collect(&index, GENERAL_AUDIO, "sh").is_empty());
        assert!(!index.remove(GENERAL_AUDIO, "shared", "shared"));
        assert!(index.is_empty());
    }

    #[test]
    fn spellings_share_a_canonical_key() {
        let mut index = PhraseIndex::default();
        index.insert(GENERAL_AUDIO, "blue train", "Blue Train");
        index.insert(GENERAL_AUDIO, "blue train", "blue train");

        assert_eq!(
            collect(&index, GENERAL_AUDIO, "blue"),
            vec!["Blue Train", "blue train"]
        );
        assert_eq!(index.phrase_count(), 2);

        index.remove(GENERAL_AUDIO, "blue train", "Blue Train");
        assert_eq!(collect(&index, GENERAL_AUDIO, "blue"), vec!["blue train"]);
    }
}
