//! In-memory library sources built on [`EventList`].

use std::sync::Arc;

use super::{EventList, FriendLibrary, ObservableList, PresenceLibrary, RemoteLibraryManager};
use crate::item::SharedItem;

#[derive(Debug, Default)]
pub struct MemoryLibraryManager {
    friends: EventList<Arc<dyn FriendLibrary>>,
}

impl MemoryLibraryManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn friends(&self) -> &EventList<Arc<dyn FriendLibrary>> {
        &self.friends
    }
}

impl RemoteLibraryManager for MemoryLibraryManager {
    fn friend_libraries(&self) -> &dyn ObservableList<Arc<dyn FriendLibrary>> {
        &self.friends
    }
}

#[derive(Debug)]
pub struct MemoryFriendLibrary {
    friend_id: String,
    presences: EventList<Arc<dyn PresenceLibrary>>,
}

impl MemoryFriendLibrary {
    pub fn new(friend_id: impl Into<String>) -> Self {
        Self {
            friend_id: friend_id.into(),
            presences: EventList::new(),
        }
    }

    pub fn presences(&self) -> &EventList<Arc<dyn PresenceLibrary>> {
        &self.presences
    }
}

impl FriendLibrary for MemoryFriendLibrary {
    fn friend_id(&self) -> &str {
        &self.friend_id
    }

    fn presence_libraries(&self) -> &dyn ObservableList<Arc<dyn PresenceLibrary>> {
        &self.presences
    }
}

#[derive(Debug)]
pub struct MemoryPresenceLibrary {
    presence_id: String,
    results: EventList<SharedItem>,
}

impl MemoryPresenceLibrary {
    pub fn new(presence_id: impl Into<String>) -> Self {
        Self {
            presence_id: presence_id.into(),
            results: EventList::new(),
        }
    }

    /// The announced files, mutable by the owner of this presence.
    pub fn files(&self) -> &EventList<SharedItem> {
        &self.results
    }
}

impl PresenceLibrary for MemoryPresenceLibrary {
    fn presence_id(&self) -> &str {
        &self.presence_id
    }

    fn results(&self) -> &dyn ObservableList<SharedItem> {
        &self.results
    }
}
