//! Friend library search index.
//!
//! This crate keeps an in-memory index over the files every connected friend
//! shares, across all of that friend's presences:
//! - Phrase index backing prefix suggestions
//! - Token index backing keyword, category and per-field matching
//! - Topology tracking of friends, presences and their announced files
//! - JSON configuration of case policy and suggestion limits

pub mod config;
pub mod error;
pub mod index;
pub mod item;
pub mod libraries;
pub mod query;
pub mod source;
pub mod storage;
pub mod tracker;
pub mod types;

// Re-export main types
pub use config::{CasePolicy, IndexConfig};
pub use error::{FriendLibraryError, Result};
pub use index::IndexData;
pub use item::{FileItem, RemoteFileItem, SharedItem};
pub use libraries::FriendLibraries;
pub use source::{
    EventList, FriendLibrary, ListEvent, ObservableList, PresenceLibrary, RemoteLibraryManager,
};
pub use tracker::{LibraryTracker, ResultIndexer};
pub use types::{
    Category, FilePropertyKey, IndexStats, PropertyValue, SearchCategory, SearchDetails,
};
