//! Keyword and per-field matching over the token index.

use std::collections::{BTreeSet, HashSet};

use crate::index::{canonicalize, has_tokens, tokenize, IndexData, IndexField};
use crate::item::SharedItem;
use crate::storage::ItemId;
use crate::types::{SearchCategory, SearchDetails};

/// Returns every indexed item matching `details`.
///
/// An item matches when it is selected by the category, every query word
/// prefixes one of its tokens under any field, and every word of each advanced
/// entry prefixes one of its tokens under that entry's field. With no words
/// at all, every item in the category matches.
pub fn matching_items(data: &IndexData, details: &SearchDetails) -> HashSet<SharedItem> {
    let policy = data.case_policy();
    let category = details.category;
    let mut candidates: Option<BTreeSet<ItemId>> = None;

    for word in tokenize(&details.query) {
        let word = canonicalize(policy, word);
        let ids = ids_with_prefix(data, IndexField::all(), category, &word);
        if !narrow(&mut candidates, ids) {
            return HashSet::new();
        }
    }

    for (&key, field_query) in &details.advanced {
        if !has_tokens(field_query) {
            continue;
        }
        if !key.is_indexable() {
            log::debug!("advanced search on non-indexed field {}", key.as_str());
            return HashSet::new();
        }
        for word in tokenize(field_query) {
            let word = canonicalize(policy, word);
            let ids = ids_with_prefix(data, [IndexField::Property(key)], category, &word);
            if !narrow(&mut candidates, ids) {
                return HashSet::new();
            }
        }
    }

    match candidates {
        Some(ids) => ids
            .into_iter()
            .filter_map(|id| data.item(id).cloned())
            .collect(),
        None => data.items_in(category).cloned().collect(),
    }
}

/// Unions the ids of every token in `fields` starting with `word`.
fn ids_with_prefix(
    data: &IndexData,
    fields: impl IntoIterator<Item = IndexField>,
    category: SearchCategory,
    word: &str,
) -> BTreeSet<ItemId> {
    fields
        .into_iter()
        .flat_map(|field| data.tokens().prefixed((field, category), word))
        .flat_map(|ids| ids.iter().copied())
        .collect()
}

/// Intersects `ids` into `candidates`. Returns false once nothing is left.
fn narrow(candidates: &mut Option<BTreeSet<ItemId>>, ids: BTreeSet<ItemId>) -> bool {
    let next = match candidates.take() {
        None => ids,
        Some(current) => current.intersection(&ids).copied().collect(),
    };
    let non_empty = !next.is_empty();
    *candidates = Some(next);
    non_empty
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CasePolicy;
    use crate::item::FileItem;
    use crate::types::{Category, FilePropertyKey};

    fn query(data: &IndexData, text: &str, category: SearchCategory) -> HashSet<SharedItem> {
        matching_items(data, &SearchDetails::new(text, category))
    }

    #[test]
    fn keyword_matching_by_category() {
        let mut data = IndexData::default();
        let item1 = FileItem::new("name1", Category::Audio).shared();
        let item2 = FileItem::new("name2", Category::Document).shared();
        let item3 = FileItem::new("blah1", Category::Audio).shared();
        for item in [&item1, &item2, &item3] {
            data.index(item);
        }

        assert_eq!(query(&data, "name", SearchCategory::Audio), HashSet::from([item1.clone()]));
        assert_eq!(query(&data, "blah", SearchCategory::Audio), HashSet::from([item3.clone()]));
        assert_eq!(
            query(&data, "na", SearchCategory::All),
            HashSet::from([item1.clone(), item2.clone()])
        );
        assert!(query(&data, "blah", SearchCategory::Document).is_empty());
        assert!(query(&data, "zzz", SearchCategory::All).is_empty());
    }

    #[test]
    fn every_word_must_match_some_field() {
        let mut data = IndexData::default();
        let train = FileItem::new("Blue Train", Category::Audio)
            .with_property(FilePropertyKey::Author, "John Coltrane")
            .shared();
        let giant = FileItem::new("Giant Steps", Category::Audio)
            .with_property(FilePropertyKey::Author, "John Coltrane")
            .shared();
        data.index(&train);
        data.index(&giant);

        assert_eq!(
            query(&data, "Blue Colt", SearchCategory::All),
            HashSet::from([train.clone()])
        );
        assert_eq!(query(&data, "John", SearchCategory::All).len(), 2);
        assert!(query(&data, "Blue Steps", SearchCategory::All).is_empty());
    }

    #[test]
    fn advanced_fields_restrict_to_that_field() {
        let mut data = IndexData::default();
        let item1 = FileItem::new("name 1", Category::Audio)
            .with_property(FilePropertyKey::Author, "nameo 1")
            .shared();
        let item2 = FileItem::new("name 2", Category::Document)
            .with_property(FilePropertyKey::Author, "nameo 2")
            .shared();
        data.index(&item1);
        data.index(&item2);

        let by_author = SearchDetails::default().with_field(FilePropertyKey::Author, "n");
        assert_eq!(
            matching_items(&data, &by_author.clone().with_category(SearchCategory::Audio)),
            HashSet::from([item1.clone()])
        );
        assert_eq!(
            matching_items(&data, &by_author.clone().with_category(SearchCategory::Document)),
            HashSet::from([item2.clone()])
        );
        assert_eq!(matching_items(&data, &by_author).len(), 2);

        // "2" is a name and author token of item2 only.
        let narrowed = SearchDetails::new("name", SearchCategory::All)
            .with_field(FilePropertyKey::Author, "nameo 2");
        assert_eq!(matching_items(&data, &narrowed), HashSet::from([item2.clone()]));

        let wrong_field = SearchDetails::default().with_field(FilePropertyKey::Title, "n");
        assert!(matching_items(&data, &wrong_field).is_empty());
    }

    #[test]
    fn non_indexable_field_matches_nothing() {
        let mut data = IndexData::default();
        data.index(
            &FileItem::new("track", Category::Audio)
                .with_property(FilePropertyKey::Bitrate, 320_i64)
                .shared(),
        );

        let details = SearchDetails::default().with_field(FilePropertyKey::Bitrate, "320");
        assert!(matching_items(&data, &details).is_empty());
    }

    #[test]
    fn blank_constraints_select_whole_category() {
        let mut data = IndexData::default();
        let song = FileItem::new("song", Category::Audio).shared();
        let paper = FileItem::new("paper", Category::Document).shared();
        data.index(&song);
        data.index(&paper);

        assert_eq!(query(&data, "", SearchCategory::All).len(), 2);
        assert_eq!(query(&data, "  ", SearchCategory::Audio), HashSet::from([song.clone()]));

        let blank_field = SearchDetails::new("", SearchCategory::Document)
            .with_field(FilePropertyKey::Author, " ");
        assert_eq!(matching_items(&data, &blank_field), HashSet::from([paper.clone()]));
    }

    #[test]
    fn case_policy_is_pinned() {
        let item = FileItem::new("Blue Train", Category::Audio).shared();

        let mut sensitive = IndexData::new(CasePolicy::Sensitive);
        sensitive.index(&item);
        assert!(query(&sensitive, "blue", SearchCategory::All).is_empty());
        assert_eq!(query(&sensitive, "Blue", SearchCategory::All).len(), 1);

        let mut insensitive = IndexData::new(CasePolicy::Insensitive);
        insensitive.index(&item);
        assert_eq!(query(&insensitive, "bLUE tr", SearchCategory::All).len(), 1);
    }
}
