//! Library topology tracker.
//!
//! Follows the friend list of a [`RemoteLibraryManager`], every friend's
//! presence list and every presence's announced results, and forwards file
//! additions and removals to a [`ResultIndexer`].
//!
//! Friends and presences are tracked by library identity, not by id: a
//! presence that reconnects under the same id is a new library, and removing
//! the old one leaves the new one attached.
//!
//! A file announced by several presences is owner-counted: it is indexed when
//! the first presence announces it and unindexed when the last one drops it.
//! Removing a friend or presence releases everything that branch announced
//! and detaches the listeners attached to it.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{FriendLibraryError, Result};
use crate::item::{RemoteFileItem, SharedItem};
use crate::source::{
    FriendLibrary, ListEvent, ListListener, ObservableList, PresenceLibrary, RemoteLibraryManager,
    SubscriptionId,
};

/// Write side of the result index.
pub trait ResultIndexer: Send + Sync {
    fn index(&self, items: &[SharedItem]);

    fn unindex(&self, items: &[SharedItem]);
}

/// Identity of a tracked library, derived from its allocation address.
///
/// Entries hold their library alive, so a key cannot be reused while tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct LibraryKey(usize);

impl LibraryKey {
    fn of<T: ?Sized>(library: &Arc<T>) -> Self {
        Self(Arc::as_ptr(library).cast::<()>() as usize)
    }
}

struct ManagerEntry {
    manager: Arc<dyn RemoteLibraryManager>,
    subscription: SubscriptionId,
    generation: u64,
}

struct FriendEntry {
    id: String,
    library: Arc<dyn FriendLibrary>,
    subscription: SubscriptionId,
    generation: u64,
    presences: HashMap<LibraryKey, PresenceEntry>,
}

struct PresenceEntry {
    id: String,
    library: Arc<dyn PresenceLibrary>,
    subscription: SubscriptionId,
    generation: u64,
    items: HashSet<SharedItem>,
}

#[derive(Default)]
struct TopologyState {
    manager: Option<ManagerEntry>,
    friends: HashMap<LibraryKey, FriendEntry>,
    /// Number of presences announcing each indexed file.
    owners: HashMap<SharedItem, usize>,
}

impl TopologyState {
    fn presence_count(&self) -> usize {
        self.friends.values().map(|friend| friend.presences.len()).sum()
    }

    fn presence_mut(&mut self, friend: LibraryKey, presence: LibraryKey) -> Option<&mut PresenceEntry> {
        self.friends
            .get_mut(&friend)
            .and_then(|entry| entry.presences.get_mut(&presence))
    }
}

struct TrackerInner {
    indexer: Arc<dyn ResultIndexer>,
    state: Mutex<TopologyState>,
    /// Stamped on every subscription so late events from a detached listener
    /// are ignored even when the same library was re-added.
    generations: AtomicU64,
}

/// Keeps the result index in sync with the friend/presence topology.
pub struct LibraryTracker {
    inner: Arc<TrackerInner>,
}

impl std::fmt::Debug for LibraryTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("LibraryTracker")
            .field("registered", &state.manager.is_some())
            .field("friends", &state.friends.len())
            .field("presences", &state.presence_count())
            .field("files", &state.owners.len())
            .finish()
    }
}

impl LibraryTracker {
    pub fn new(indexer: Arc<dyn ResultIndexer>) -> Self {
        Self {
            inner: Arc::new(TrackerInner {
                indexer,
                state: Mutex::new(TopologyState::default()),
                generations: AtomicU64::new(0),
            }),
        }
    }

    /// Subscribes to `manager` and indexes every file currently announced.
    ///
    /// A source that fails to enumerate aborts the registration: everything
    /// attached so far is detached again and the error is returned.
    pub fn register(&self, manager: Arc<dyn RemoteLibraryManager>) -> Result<()> {
        let mut state = self.inner.state.lock();
        if state.manager.is_some() {
            return Err(FriendLibraryError::AlreadyRegistered);
        }

        let generation = self.inner.next_generation();
        let subscription = manager
            .friend_libraries()
            .subscribe(friends_listener(&self.inner, generation));
        state.manager = Some(ManagerEntry {
            manager: manager.clone(),
            subscription,
            generation,
        });

        let attached = manager
            .friend_libraries()
            .snapshot()
            .and_then(|friends| self.inner.add_friends(&mut state, &friends));
        if let Err(error) = attached {
            log::warn!("failed to register library manager: {error}");
            self.inner.detach(&mut state);
            return Err(error);
        }

        log::info!(
            "registered library manager: friends={} presences={} files={}",
            state.friends.len(),
            state.presence_count(),
            state.owners.len()
        );
        Ok(())
    }

    /// Detaches every listener and unindexes every tracked file.
    ///
    /// Returns false if no manager was registered.
    pub fn unregister(&self) -> bool {
        let mut state = self.inner.state.lock();
        let registered = state.manager.is_some();
        if registered {
            let files = state.owners.len();
            self.inner.detach(&mut state);
            log::info!("unregistered library manager: released {files} files");
        }
        registered
    }

    pub fn is_registered(&self) -> bool {
        self.inner.state.lock().manager.is_some()
    }

    pub fn friend_count(&self) -> usize {
        self.inner.state.lock().friends.len()
    }

    pub fn presence_count(&self) -> usize {
        self.inner.state.lock().presence_count()
    }

    /// Number of distinct files announced by at least one presence.
    pub fn file_count(&self) -> usize {
        self.inner.state.lock().owners.len()
    }
}

impl Drop for LibraryTracker {
    fn drop(&mut self) {
        self.unregister();
    }
}

fn friends_listener(
    inner: &Arc<TrackerInner>,
    generation: u64,
) -> ListListener<Arc<dyn FriendLibrary>> {
    let weak = Arc::downgrade(inner);
    Arc::new(move |event: &ListEvent<Arc<dyn FriendLibrary>>| -> Result<()> {
        let Some(inner) = weak.upgrade() else {
            return Ok(());
        };
        let mut state = inner.state.lock();
        if state.manager.as_ref().map(|entry| entry.generation) != Some(generation) {
            return Ok(());
        }
        match event {
            ListEvent::Added(friends) => inner.add_friends(&mut state, friends),
            ListEvent::Removed(friends) => {
                for friend in friends {
                    inner.remove_friend(&mut state, LibraryKey::of(friend));
                }
                Ok(())
            }
            ListEvent::Cleared => {
                inner.remove_all_friends(&mut state);
                Ok(())
            }
            ListEvent::Replaced(friends) => {
                inner.remove_all_friends(&mut state);
                inner.add_friends(&mut state, friends)
            }
        }
    })
}

fn presences_listener(
    inner: &Arc<TrackerInner>,
    friend: LibraryKey,
    generation: u64,
) -> ListListener<Arc<dyn PresenceLibrary>> {
    let weak = Arc::downgrade(inner);
    Arc::new(move |event: &ListEvent<Arc<dyn PresenceLibrary>>| -> Result<()> {
        let Some(inner) = weak.upgrade() else {
            return Ok(());
        };
        let mut state = inner.state.lock();
        if state.friends.get(&friend).map(|entry| entry.generation) != Some(generation) {
            return Ok(());
        }
        match event {
            ListEvent::Added(presences) => inner.add_presences(&mut state, friend, presences),
            ListEvent::Removed(presences) => {
                for presence in presences {
                    inner.remove_presence(&mut state, friend, LibraryKey::of(presence));
                }
                Ok(())
            }
            ListEvent::Cleared => {
                inner.remove_all_presences(&mut state, friend);
                Ok(())
            }
            ListEvent::Replaced(presences) => {
                inner.remove_all_presences(&mut state, friend);
                inner.add_presences(&mut state, friend, presences)
            }
        }
    })
}

fn results_listener(
    inner: &Arc<TrackerInner>,
    friend: LibraryKey,
    presence: LibraryKey,
    generation: u64,
) -> ListListener<SharedItem> {
    let weak = Arc::downgrade(inner);
    Arc::new(move |event: &ListEvent<SharedItem>| -> Result<()> {
        let Some(inner) = weak.upgrade() else {
            return Ok(());
        };
        let mut state = inner.state.lock();
        let current = state
            .presence_mut(friend, presence)
            .map(|entry| entry.generation);
        if current != Some(generation) {
            return Ok(());
        }
        match event {
            ListEvent::Added(items) => inner.add_items(&mut state, friend, presence, items),
            ListEvent::Removed(items) => inner.remove_items(&mut state, friend, presence, items),
            ListEvent::Cleared => inner.clear_presence(&mut state, friend, presence),
            ListEvent::Replaced(items) => inner.replace_presence(&mut state, friend, presence, items),
        }
        Ok(())
    })
}

/// Keeps the first error of a batch.
fn first_error(results: impl IntoIterator<Item = Result<()>>) -> Result<()> {
    let mut first = None;
    for result in results {
        if let Err(error) = result {
            first.get_or_insert(error);
        }
    }
    match first {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

impl TrackerInner {
    fn next_generation(&self) -> u64 {
        self.generations.fetch_add(1, Ordering::Relaxed)
    }

    /// Attaches every friend of the batch. One that fails does not stop the
    /// rest; the first failure is returned once all were tried.
    fn add_friends(
        self: &Arc<Self>,
        state: &mut TopologyState,
        friends: &[Arc<dyn FriendLibrary>],
    ) -> Result<()> {
        let results: Vec<Result<()>> = friends
            .iter()
            .map(|friend| self.add_friend(state, friend))
            .collect();
        first_error(results)
    }

    /// A friend whose presence list cannot be read is not tracked. A presence
    /// that cannot be read is skipped and the friend keeps the others.
    fn add_friend(
        self: &Arc<Self>,
        state: &mut TopologyState,
        friend: &Arc<dyn FriendLibrary>,
    ) -> Result<()> {
        let key = LibraryKey::of(friend);
        let friend_id = friend.friend_id().to_string();
        if state.friends.contains_key(&key) {
            log::debug!("friend {friend_id} is already tracked");
            return Ok(());
        }

        let generation = self.next_generation();
        let subscription = friend
            .presence_libraries()
            .subscribe(presences_listener(self, key, generation));
        state.friends.insert(
            key,
            FriendEntry {
                id: friend_id.clone(),
                library: friend.clone(),
                subscription,
                generation,
                presences: HashMap::new(),
            },
        );

        let presences = match friend.presence_libraries().snapshot() {
            Ok(presences) => presences,
            Err(error) => {
                log::warn!("cannot list presences of friend {friend_id}: {error}");
                self.remove_friend(state, key);
                return Err(error);
            }
        };
        let attached = self.add_presences(state, key, &presences);
        log::debug!(
            "tracking friend {friend_id} with {} presences",
            presences.len()
        );
        attached
    }

    fn add_presences(
        self: &Arc<Self>,
        state: &mut TopologyState,
        friend: LibraryKey,
        presences: &[Arc<dyn PresenceLibrary>],
    ) -> Result<()> {
        let results: Vec<Result<()>> = presences
            .iter()
            .map(|presence| self.add_presence(state, friend, presence))
            .collect();
        first_error(results)
    }

    fn add_presence(
        self: &Arc<Self>,
        state: &mut TopologyState,
        friend: LibraryKey,
        presence: &Arc<dyn PresenceLibrary>,
    ) -> Result<()> {
        let key = LibraryKey::of(presence);
        let presence_id = presence.presence_id().to_string();
        let Some(friend_entry) = state.friends.get_mut(&friend) else {
            return Ok(());
        };
        let friend_id = friend_entry.id.clone();
        if friend_entry.presences.contains_key(&key) {
            log::debug!("presence {presence_id} of friend {friend_id} is already tracked");
            return Ok(());
        }

        let generation = self.next_generation();
        let subscription = presence
            .results()
            .subscribe(results_listener(self, friend, key, generation));
        friend_entry.presences.insert(
            key,
            PresenceEntry {
                id: presence_id.clone(),
                library: presence.clone(),
                subscription,
                generation,
                items: HashSet::new(),
            },
        );

        let items = match presence.results().snapshot() {
            Ok(items) => items,
            Err(error) => {
                log::warn!(
                    "cannot list files of presence {presence_id} of friend {friend_id}: {error}"
                );
                self.remove_presence(state, friend, key);
                return Err(error);
            }
        };
        self.add_items(state, friend, key, &items);
        log::debug!(
            "tracking presence {presence_id} of friend {friend_id} with {} files",
            items.len()
        );
        Ok(())
    }

    fn add_items(
        &self,
        state: &mut TopologyState,
        friend: LibraryKey,
        presence: LibraryKey,
        items: &[SharedItem],
    ) {
        let Some(entry) = state
            .friends
            .get_mut(&friend)
            .and_then(|friend| friend.presences.get_mut(&presence))
        else {
            return;
        };

        let mut fresh = Vec::new();
        for item in items {
            if !entry.items.insert(item.clone()) {
                continue;
            }
            let owners = state.owners.entry(item.clone()).or_insert(0);
            *owners += 1;
            if *owners == 1 {
                fresh.push(item.clone());
            }
        }
        if !fresh.is_empty() {
            self.indexer.index(&fresh);
        }
    }

    fn remove_items(
        &self,
        state: &mut TopologyState,
        friend: LibraryKey,
        presence: LibraryKey,
        items: &[SharedItem],
    ) {
        let Some(entry) = state.presence_mut(friend, presence) else {
            return;
        };
        let dropped: Vec<SharedItem> = items
            .iter()
            .filter(|item| entry.items.remove(*item))
            .cloned()
            .collect();
        self.release(&mut state.owners, dropped);
    }

    fn clear_presence(&self, state: &mut TopologyState, friend: LibraryKey, presence: LibraryKey) {
        let Some(entry) = state.presence_mut(friend, presence) else {
            return;
        };
        let previous = std::mem::take(&mut entry.items);
        self.release(&mut state.owners, previous);
    }

    /// Files kept across the swap are never unindexed.
    fn replace_presence(
        &self,
        state: &mut TopologyState,
        friend: LibraryKey,
        presence: LibraryKey,
        items: &[SharedItem],
    ) {
        let Some(entry) = state.presence_mut(friend, presence) else {
            return;
        };
        let previous = std::mem::take(&mut entry.items);
        self.add_items(state, friend, presence, items);
        self.release(&mut state.owners, previous);
    }

    fn remove_presence(
        &self,
        state: &mut TopologyState,
        friend: LibraryKey,
        presence: LibraryKey,
    ) -> bool {
        let Some(friend_entry) = state.friends.get_mut(&friend) else {
            return false;
        };
        let Some(entry) = friend_entry.presences.remove(&presence) else {
            return false;
        };
        let friend_id = friend_entry.id.clone();
        self.drop_presence(&mut state.owners, &friend_id, entry);
        true
    }

    fn remove_all_presences(&self, state: &mut TopologyState, friend: LibraryKey) {
        let Some(friend_entry) = state.friends.get_mut(&friend) else {
            return;
        };
        let friend_id = friend_entry.id.clone();
        let presences = std::mem::take(&mut friend_entry.presences);
        for entry in presences.into_values() {
            self.drop_presence(&mut state.owners, &friend_id, entry);
        }
    }

    fn remove_friend(&self, state: &mut TopologyState, friend: LibraryKey) -> bool {
        let Some(entry) = state.friends.remove(&friend) else {
            return false;
        };
        entry
            .library
            .presence_libraries()
            .unsubscribe(entry.subscription);
        for presence in entry.presences.into_values() {
            self.drop_presence(&mut state.owners, &entry.id, presence);
        }
        log::debug!("stopped tracking friend {}", entry.id);
        true
    }

    fn remove_all_friends(&self, state: &mut TopologyState) {
        let friends: Vec<LibraryKey> = state.friends.keys().copied().collect();
        for friend in friends {
            self.remove_friend(state, friend);
        }
    }

    fn drop_presence(
        &self,
        owners: &mut HashMap<SharedItem, usize>,
        friend_id: &str,
        presence: PresenceEntry,
    ) {
        presence.library.results().unsubscribe(presence.subscription);
        log::debug!(
            "stopped tracking presence {} of friend {friend_id} with {} files",
            presence.id,
            presence.items.len()
        );
        self.release(owners, presence.items);
    }

    /// Drops one ownership of each item, unindexing those left without owners.
    fn release(&self, owners: &mut HashMap<SharedItem, usize>, items: impl IntoIterator<Item = SharedItem>) {
        let mut orphaned = Vec::new();
        for item in items {
            match owners.get_mut(&item) {
                Some(count) if *count > 1 => *count -= 1,
                Some(_) => {
                    owners.remove(&item);
                    orphaned.push(item);
                }
                None => log::warn!("released untracked file {}", item.name()),
            }
        }
        if !orphaned.is_empty() {
            self.indexer.unindex(&orphaned);
        }
    }

    fn detach(&self, state: &mut TopologyState) {
        if let Some(entry) = state.manager.take() {
            entry
                .manager
                .friend_libraries()
                .unsubscribe(entry.subscription);
        }
        self.remove_all_friends(state);
    }
}
