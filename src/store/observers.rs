use std::collections::BTreeMap;
use std::sync::Arc;

/// Callback invoked with the new state after every notified mutation
pub type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Identifies one registration in an [`ObserverList`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

/// Listener registry that notifies in registration order.
///
/// Ids increase monotonically and are never reused, so iterating the map in
/// key order is registration order.
pub struct ObserverList<T> {
    listeners: BTreeMap<ListenerId, Listener<T>>,
    next_id: u64,
}

impl<T> Default for ObserverList<T> {
    fn default() -> Self {
        Self {
            listeners: BTreeMap::new(),
            next_id: 0,
        }
    }
}

impl<T> ObserverList<T> {
    pub fn subscribe(&mut self, listener: Listener<T>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.insert(id, listener);
        id
    }

    /// Returns false if `id` was not registered
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Copy of the current listeners, in registration order, so they can be
    /// called after the owner's lock is released.
    pub fn snapshot(&self) -> Vec<Listener<T>> {
        self.listeners.values().cloned().collect()
    }
}
