//! The shared-file capability the index consumes, and identity handles for it.
//!
//! Items are owned by the library sources. The index only keeps a
//! [`SharedItem`] handle, whose equality and hash are pointer identity: two
//! handles are the same item exactly when they point at the same allocation.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

use crate::types::{Category, FilePropertyKey, PropertyValue};

/// A file announced by a friend's presence.
pub trait RemoteFileItem: fmt::Debug + Send + Sync {
    /// Display name without the file extension.
    fn name(&self) -> &str;

    fn category(&self) -> Category;

    /// Returns the value of `key`, or `None` when the file does not carry it.
    fn property(&self, key: FilePropertyKey) -> Option<PropertyValue>;
}

/// Identity of an item handle, derived from its allocation address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemKey(usize);

/// Reference-counted handle to an externally-owned item.
#[derive(Clone)]
pub struct SharedItem(Arc<dyn RemoteFileItem>);

impl SharedItem {
    pub fn new<T: RemoteFileItem + 'static>(item: T) -> Self {
        Self(Arc::new(item))
    }

    pub fn from_arc(item: Arc<dyn RemoteFileItem>) -> Self {
        Self(item)
    }

    #[inline]
    pub fn key(&self) -> ItemKey {
        ItemKey(Arc::as_ptr(&self.0) as *const () as usize)
    }
}

impl Deref for SharedItem {
    type Target = dyn RemoteFileItem;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl PartialEq for SharedItem {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for SharedItem {}

impl Hash for SharedItem {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Debug for SharedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedItem").field(&self.0).finish()
    }
}

/// A plain in-memory file description.
#[derive(Debug, Clone)]
pub struct FileItem {
    name: String,
    category: Category,
    properties: BTreeMap<FilePropertyKey, PropertyValue>,
}

impl FileItem {
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            category,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, key: FilePropertyKey, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key, value.into());
        self
    }

    /// Wraps the item into a handle ready to be announced.
    pub fn shared(self) -> SharedItem {
        SharedItem::new(self)
    }
}

impl RemoteFileItem for FileItem {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        self.category
    }

    fn property(&self, key: FilePropertyKey) -> Option<PropertyValue> {
        self.properties.get(&key).cloned()
    }
}
