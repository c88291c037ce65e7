//! Prefix completion over the phrase index.

use std::collections::BTreeSet;

use crate::index::{canonicalize, IndexData};
use crate::types::{FilePropertyKey, SearchCategory};

/// Returns the distinct phrases in the `(field, category)` bucket that start
/// with `prefix`, capped at `limit` entries when one is given.
///
/// `field == None` selects the general bucket holding names and every
/// indexable value. A field outside the indexable set yields nothing. The
/// prefix is compared verbatim (whitespace included) under the index's case
/// policy, and phrases come back as they were announced.
pub fn suggestions(
    data: &IndexData,
    prefix: &str,
    category: SearchCategory,
    field: Option<FilePropertyKey>,
    limit: Option<usize>,
) -> BTreeSet<String> {
    if field.is_some_and(|key| !key.is_indexable()) {
        return BTreeSet::new();
    }

    let canonical = canonicalize(data.case_policy(), prefix);
    data.phrases()
        .prefixed((field, category), &canonical)
        .take(limit.unwrap_or(usize::MAX))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CasePolicy;
    use crate::item::FileItem;
    use crate::types::Category;

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn general_bucket_completes_names_and_values() {
        let mut data = IndexData::default();
        data.index(
            &FileItem::new("name1", Category::Audio)
                .with_property(FilePropertyKey::Album, "nameo")
                .shared(),
        );

        assert_eq!(
            suggestions(&data, "name", SearchCategory::Audio, None, None),
            set(&["name1", "nameo"])
        );
        assert_eq!(
            suggestions(&data, "nameo", SearchCategory::All, Some(FilePropertyKey::Album), None),
            set(&["nameo"])
        );
        assert!(suggestions(&data, "nameo", SearchCategory::All, Some(FilePropertyKey::Title), None).is_empty());
        assert!(suggestions(&data, "name", SearchCategory::Document, None, None).is_empty());
    }

    #[test]
    fn whitespace_in_prefix_is_significant() {
        let mut data = IndexData::default();
        data.index(
            &FileItem::new("name 1", Category::Audio)
                .with_property(FilePropertyKey::Author, "nameo 1")
                .shared(),
        );

        assert_eq!(suggestions(&data, "name", SearchCategory::All, None, None).len(), 2);
        assert_eq!(
            suggestions(&data, "name ", SearchCategory::All, None, None),
            set(&["name 1"])
        );
    }

    #[test]
    fn empty_prefix_returns_whole_bucket() {
        let mut data = IndexData::default();
        data.index(&FileItem::new("alpha", Category::Audio).shared());
        data.index(&FileItem::new("beta", Category::Video).shared());

        assert_eq!(
            suggestions(&data, "", SearchCategory::All, None, None),
            set(&["alpha", "beta"])
        );
        assert_eq!(
            suggestions(&data, "", SearchCategory::Video, None, None),
            set(&["beta"])
        );
    }

    #[test]
    fn non_indexable_field_yields_nothing() {
        let mut data = IndexData::default();
        data.index(
            &FileItem::new("track", Category::Audio)
                .with_property(FilePropertyKey::Bitrate, 320_i64)
                .shared(),
        );

        assert!(suggestions(&data, "", SearchCategory::All, Some(FilePropertyKey::Bitrate), None).is_empty());
        assert_eq!(
            suggestions(&data, "", SearchCategory::All, None, None),
            set(&["track"])
        );
    }

    #[test]
    fn limit_caps_results() {
        let mut data = IndexData::default();
        for name in ["name1", "name2", "name3"] {
            data.index(&FileItem::new(name, Category::Audio).shared());
        }

        assert_eq!(
            suggestions(&data, "name", SearchCategory::Audio, None, Some(2)),
            set(&["name1", "name2"])
        );
        assert!(suggestions(&data, "name", SearchCategory::Audio, None, Some(0)).is_empty());
    }

    #[test]
    fn case_policy_decides_prefix_comparison() {
        let item = FileItem::new("Blue Train", Category::Audio).shared();

        let mut sensitive = IndexData::new(CasePolicy::Sensitive);
        sensitive.index(&item);
        assert!(suggestions(&sensitive, "blue", SearchCategory::All, None, None).is_empty());
        assert_eq!(
            suggestions(&sensitive, "Blue", SearchCategory::All, None, None),
            set(&["Blue Train"])
        );

        let mut insensitive = IndexData::new(CasePolicy::Insensitive);
        insensitive.index(&item);
        assert_eq!(
            suggestions(&insensitive, "BLUE t", SearchCategory::All, None, None),
            set(&["Blue Train"])
        );
    }
}
