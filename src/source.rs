//! Observable library sources: the friends, their presences and the results
//! each presence announces.
//!
//! Each level is an [`ObservableList`]. Listeners are called synchronously on
//! the mutating thread and may fail; a failure is handed back to whoever
//! mutated the list.

mod event_list;
mod memory;

use std::sync::Arc;

use crate::error::Result;
use crate::item::SharedItem;

pub use event_list::EventList;
pub use memory::{MemoryFriendLibrary, MemoryLibraryManager, MemoryPresenceLibrary};

/// Handle returned by [`ObservableList::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);

/// A change to an observable list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEvent<T> {
    Added(Vec<T>),
    Removed(Vec<T>),
    Cleared,
    /// The whole content was swapped for the given elements.
    Replaced(Vec<T>),
}

pub type ListListener<T> = Arc<dyn Fn(&ListEvent<T>) -> Result<()> + Send + Sync>;

/// A list whose changes can be observed.
pub trait ObservableList<T>: Send + Sync {
    /// Returns the current elements.
    fn snapshot(&self) -> Result<Vec<T>>;

    fn subscribe(&self, listener: ListListener<T>) -> SubscriptionId;

    /// Detaches a listener. Returns false if it was not subscribed.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

/// Entry point listing the friends whose libraries are browsable.
pub trait RemoteLibraryManager: Send + Sync {
    fn friend_libraries(&self) -> &dyn ObservableList<Arc<dyn FriendLibrary>>;
}

/// One friend and their connected presences.
pub trait FriendLibrary: Send + Sync {
    fn friend_id(&self) -> &str;

    fn presence_libraries(&self) -> &dyn ObservableList<Arc<dyn PresenceLibrary>>;
}

/// One connected session of a friend, announcing its shared files.
pub trait PresenceLibrary: Send + Sync {
    fn presence_id(&self) -> &str;

    fn results(&self) -> &dyn ObservableList<SharedItem>;
}
