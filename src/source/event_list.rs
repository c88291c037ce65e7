//! Thread-safe in-memory observable list.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use super::{ListEvent, ListListener, ObservableList, SubscriptionId};
use crate::error::Result;

/// An in-memory [`ObservableList`].
///
/// Mutations are serialized and each one notifies every listener after the
/// element lock is released, so listeners may snapshot the list. Listeners
/// must not mutate the list that is notifying them.
pub struct EventList<T> {
    items: Mutex<Vec<T>>,
    listeners: Mutex<Vec<(SubscriptionId, ListListener<T>)>>,
    /// Held across a mutation and its notification to keep events ordered.
    update: Mutex<()>,
    next_subscription: AtomicU64,
}

impl<T> Default for EventList<T> {
    fn default() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
            listeners: Mutex::new(Vec::new()),
            update: Mutex::new(()),
            next_subscription: AtomicU64::new(0),
        }
    }
}

impl<T> fmt::Debug for EventList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventList")
            .field("len", &self.items.lock().len())
            .field("listeners", &self.listeners.lock().len())
            .finish()
    }
}

impl<T: Clone + Send + Sync> EventList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.items.lock().clone()
    }

    pub fn push(&self, item: T) -> Result<()> {
        self.extend([item])
    }

    /// Appends `items` and announces them in one `Added` event.
    pub fn extend(&self, items: impl IntoIterator<Item = T>) -> Result<()> {
        let _update = self.update.lock();
        let added: Vec<T> = items.into_iter().collect();
        if added.is_empty() {
            return Ok(());
        }
        self.items.lock().extend(added.iter().cloned());
        self.notify(&ListEvent::Added(added))
    }

    /// Removes every element matching `predicate`, returning how many went.
    pub fn remove_where(&self, mut predicate: impl FnMut(&T) -> bool) -> Result<usize> {
        let _update = self.update.lock();
        let removed: Vec<T> = {
            let mut items = self.items.lock();
            let (removed, kept): (Vec<T>, Vec<T>) =
                items.drain(..).partition(|item| predicate(item));
            *items = kept;
            removed
        };
        if removed.is_empty() {
            return Ok(0);
        }
        let count = removed.len();
        self.notify(&ListEvent::Removed(removed))?;
        Ok(count)
    }

    pub fn clear(&self) -> Result<()> {
        let _update = self.update.lock();
        {
            let mut items = self.items.lock();
            if items.is_empty() {
                return Ok(());
            }
            items.clear();
        }
        self.notify(&ListEvent::Cleared)
    }

    /// Swaps the whole content for `items`.
    pub fn replace(&self, items: impl IntoIterator<Item = T>) -> Result<()> {
        let _update = self.update.lock();
        let replacement: Vec<T> = items.into_iter().collect();
        *self.items.lock() = replacement.clone();
        self.notify(&ListEvent::Replaced(replacement))
    }

    /// Calls every listener, returning the first failure after all ran.
    fn notify(&self, event: &ListEvent<T>) -> Result<()> {
        let listeners: Vec<ListListener<T>> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        let mut first_error = None;
        for listener in listeners {
            if let Err(error) = listener(event) {
                log::warn!("list listener failed: {error}");
                first_error.get_or_insert(error);
            }
        }
        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl<T: Clone + Send + Sync> ObservableList<T> for EventList<T> {
    fn snapshot(&self) -> Result<Vec<T>> {
        Ok(self.to_vec())
    }

    fn subscribe(&self, listener: ListListener<T>) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.listeners.lock().push((id, listener));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(subscription, _)| *subscription != id);
        listeners.len() != before
    }
}
