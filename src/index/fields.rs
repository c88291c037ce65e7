//! Extraction of indexable (field, value) pairs from an item.

use crate::item::RemoteFileItem;
use crate::types::FilePropertyKey;

use super::tokenize::has_tokens;

/// The field a value was read from: the display name or an indexable property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IndexField {
    Name,
    Property(FilePropertyKey),
}

impl IndexField {
    /// Every field that can carry tokens: the name, then each indexable key.
    pub fn all() -> impl Iterator<Item = IndexField> {
        std::iter::once(Self::Name).chain(
            FilePropertyKey::INDEXABLE
                .iter()
                .copied()
                .map(Self::Property),
        )
    }

    pub fn property(self) -> Option<FilePropertyKey> {
        match self {
            Self::Name => None,
            Self::Property(key) => Some(key),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedField {
    pub field: IndexField,
    pub value: String,
}

/// Reads the display name and every present indexable property of `item`.
///
/// Values with no tokens contribute nothing and are skipped.
pub fn extract_fields(item: &dyn RemoteFileItem) -> Vec<ExtractedField> {
    let mut fields = Vec::with_capacity(1 + FilePropertyKey::INDEXABLE.len());

    let name = item.name();
    if has_tokens(name) {
        fields.push(ExtractedField {
            field: IndexField::Name,
            value: name.to_string(),
        });
    }

    for &key in FilePropertyKey::INDEXABLE {
        let Some(value) = item.property(key) else {
            continue;
        };
        let value = value.to_string();
        if has_tokens(&value) {
            fields.push(ExtractedField {
                field: IndexField::Property(key),
                value,
            });
        }
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::FileItem;
    use crate::types::Category;

    #[test]
    fn name_only_item() {
        let item = FileItem::new("name1", Category::Audio);
        assert_eq!(
            extract_fields(&item),
            vec![ExtractedField {
                field: IndexField::Name,
                value: "name1".to_string(),
            }]
        );
    }

    #[test]
    fn non_indexable_and_blank_properties_are_skipped() {
        let item = FileItem::new("name1", Category::Audio)
            .with_property(FilePropertyKey::Bitrate, 320_i64)
            .with_property(FilePropertyKey::Genre, "   ")
            .with_property(FilePropertyKey::Album, "nameo");

        let fields = extract_fields(&item);
        let keys: Vec<_> = fields.iter().map(|field| field.field).collect();
        assert_eq!(
            keys,
            vec![
                IndexField::Name,
                IndexField::Property(FilePropertyKey::Album)
            ]
        );
    }

    #[test]
    fn numeric_properties_are_rendered() {
        let item = FileItem::new("track", Category::Audio).with_property(FilePropertyKey::Year, 1999_i64);
        let fields = extract_fields(&item);
        assert_eq!(fields[1].field, IndexField::Property(FilePropertyKey::Year));
        assert_eq!(fields[1].value, "1999");
    }

    #[test]
    fn all_fields_start_with_name() {
        let fields: Vec<_> = IndexField::all().collect();
        assert_eq!(fields[0], IndexField::Name);
        assert_eq!(fields.len(), 1 + FilePropertyKey::INDEXABLE.len());
        assert_eq!(fields[1].property(), Some(FilePropertyKey::Album));
    }
}
