//! FriendLibraries - main API for searching friends' shared files.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::{index_config_path, load_index_config, IndexConfig};
use crate::error::Result;
use crate::index::IndexData;
use crate::item::SharedItem;
use crate::query::{matching_items, suggestions};
use crate::source::RemoteLibraryManager;
use crate::tracker::{LibraryTracker, ResultIndexer};
use crate::types::{FilePropertyKey, IndexStats, SearchCategory, SearchDetails};

/// The index behind a single lock. Writes only go through `index`/`unindex`.
#[derive(Debug)]
struct SharedIndex {
    data: RwLock<IndexData>,
}

impl ResultIndexer for SharedIndex {
    fn index(&self, items: &[SharedItem]) {
        let mut data = self.data.write();
        for item in items {
            data.index(item);
        }
    }

    fn unindex(&self, items: &[SharedItem]) {
        let mut data = self.data.write();
        for item in items {
            data.unindex(item);
        }
    }
}

/// Suggestion and matching queries over every file announced by the
/// presences of every tracked friend.
#[derive(Debug)]
pub struct FriendLibraries {
    config: IndexConfig,
    index: Arc<SharedIndex>,
    tracker: LibraryTracker,
}

impl Default for FriendLibraries {
    fn default() -> Self {
        Self::new(IndexConfig::default())
    }
}

impl FriendLibraries {
    pub fn new(config: IndexConfig) -> Self {
        let index = Arc::new(SharedIndex {
            data: RwLock::new(IndexData::new(config.case_policy)),
        });
        let tracker = LibraryTracker::new(index.clone());
        log::debug!(
            "created friend library index: case_policy={:?} suggestion_limit={:?}",
            config.case_policy,
            config.suggestion_limit
        );
        Self {
            config,
            index,
            tracker,
        }
    }

    /// Builds the index with the config file found in `dir`, if any.
    pub fn from_config_dir(dir: &Path) -> Result<Self> {
        let config = load_index_config(&index_config_path(dir))?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Starts tracking `manager`; see [`LibraryTracker::register`].
    pub fn register(&self, manager: Arc<dyn RemoteLibraryManager>) -> Result<()> {
        self.tracker.register(manager)
    }

    /// Stops tracking and empties the index.
    pub fn unregister(&self) -> bool {
        self.tracker.unregister()
    }

    /// Completes `prefix` against names and indexable values in `category`.
    pub fn suggest(&self, prefix: &str, category: SearchCategory) -> BTreeSet<String> {
        let data = self.index.data.read();
        suggestions(&data, prefix, category, None, self.config.suggestion_limit)
    }

    /// Completes `prefix` against the values of `key` in `category`.
    pub fn suggest_for_field(
        &self,
        prefix: &str,
        category: SearchCategory,
        key: FilePropertyKey,
    ) -> BTreeSet<String> {
        let data = self.index.data.read();
        suggestions(&data, prefix, category, Some(key), self.config.suggestion_limit)
    }

    pub fn matching_items(&self, details: &SearchDetails) -> HashSet<SharedItem> {
        let data = self.index.data.read();
        matching_items(&data, details)
    }

    pub fn stats(&self) -> IndexStats {
        let mut stats = self.index.data.read().stats();
        stats.friends = self.tracker.friend_count();
        stats.presences = self.tracker.presence_count();
        stats
    }
}
