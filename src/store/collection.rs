use std::sync::{Arc, Mutex, MutexGuard, Weak};

use super::observers::{ListenerId, ObserverList};
use super::storage::Storage;
use super::{CollectionKind, Notice, NotifyPolicy};
use crate::api::models::CardRecord;
use crate::error::{Result, TrackerError};

/// Immutable view of a collection at one point in time.
/// Each mutation installs a new vector; earlier snapshots never change.
pub type Snapshot = Arc<Vec<CardRecord>>;

struct Inner {
    cards: Snapshot,
    observers: ObserverList<Snapshot>,
}

/// Insertion-ordered, unique-by-id card set persisted under a fixed key.
///
/// The card sequence and the listener set share one mutex. Mutations also
/// hold a delivery mutex from the state change until every listener has run,
/// so notifications arrive in mutation order. Listeners run with the state
/// mutex released and may read the store they are registered on, but must
/// not mutate it.
pub struct CollectionStore {
    kind: CollectionKind,
    storage: Arc<dyn Storage>,
    policy: NotifyPolicy,
    inner: Arc<Mutex<Inner>>,
    delivery: Mutex<()>,
}

/// Handle returned by [`CollectionStore::subscribe`]
#[must_use = "dropping the handle leaves the listener registered with no way to remove it"]
pub struct Subscription {
    inner: Weak<Mutex<Inner>>,
    id: ListenerId,
}

impl Subscription {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Stop receiving notifications. False if the store is gone or the
    /// listener was already removed.
    pub fn unsubscribe(self) -> bool {
        let Some(inner) = self.inner.upgrade() else {
            return false;
        };
        let removed = lock(&inner).observers.unsubscribe(self.id);
        removed
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(|e| e.into_inner())
}

impl CollectionStore {
    /// Open a collection, loading whatever was persisted for `kind`.
    /// Missing or unreadable data yields an empty collection.
    pub fn open(kind: CollectionKind, storage: Arc<dyn Storage>) -> Self {
        let cards = Self::hydrate(kind, storage.as_ref());
        Self {
            kind,
            storage,
            policy: NotifyPolicy::default(),
            inner: Arc::new(Mutex::new(Inner {
                cards: Arc::new(cards),
                observers: ObserverList::default(),
            })),
            delivery: Mutex::new(()),
        }
    }

    pub fn with_policy(mut self, policy: NotifyPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn hydrate(kind: CollectionKind, storage: &dyn Storage) -> Vec<CardRecord> {
        let key = kind.storage_key();
        match storage.get(key) {
            Ok(Some(content)) => match serde_json::from_str::<Vec<CardRecord>>(&content) {
                Ok(cards) => {
                    log::info!("Loaded {} with {} cards", kind.title(), cards.len());
                    cards
                }
                Err(e) => {
                    log::warn!("Failed to parse {}, starting empty: {}", key, e);
                    Vec::new()
                }
            },
            Ok(None) => {
                log::info!("No stored {}, starting empty", kind.title());
                Vec::new()
            }
            Err(e) => {
                log::warn!("Failed to read {}, starting empty: {}", key, e);
                Vec::new()
            }
        }
    }

    /// Write the whole sequence. Failures are logged, not returned.
    fn persist(&self, cards: &[CardRecord]) {
        let key = self.kind.storage_key();
        let result = serde_json::to_string(cards)
            .map_err(TrackerError::from)
            .and_then(|content| self.storage.set(key, &content));
        if let Err(e) = result {
            log::warn!("Failed to save {}: {}", key, e);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        lock(&self.inner)
    }

    fn lock_delivery(&self) -> MutexGuard<'_, ()> {
        self.delivery.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn emit(&self, notice: Notice) -> Notice {
        log::info!("[{}] {}", self.kind.title(), notice);
        notice
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    /// Append `card` unless a card with the same id is already present.
    ///
    /// A duplicate leaves storage untouched and notifies nobody.
    pub fn add(&self, card: CardRecord) -> Result<Notice> {
        if card.id.is_empty() {
            return Err(TrackerError::EmptyCardId);
        }

        let _delivery = self.lock_delivery();
        let (cards, listeners) = {
            let mut inner = self.lock();
            if inner.cards.iter().any(|c| c.id == card.id) {
                log::debug!("{} already present in {}", card.id, self.kind.title());
                return Ok(self.emit(Notice::info(self.kind.already_present_message())));
            }

            let mut next = Vec::with_capacity(inner.cards.len() + 1);
            next.extend(inner.cards.iter().cloned());
            next.push(card);
            let next = Arc::new(next);

            self.persist(&next);
            inner.cards = next.clone();
            (next, inner.observers.snapshot())
        };

        for listener in &listeners {
            listener(&cards);
        }

        Ok(self.emit(Notice::success(self.kind.added_message())))
    }

    /// Drop the card with `card_id`. Storage is rewritten and a success
    /// notice returned whether or not the card was present.
    pub fn remove(&self, card_id: &str) -> Notice {
        let _delivery = self.lock_delivery();
        let (cards, listeners) = {
            let mut inner = self.lock();
            let next: Vec<CardRecord> = inner
                .cards
                .iter()
                .filter(|c| c.id != card_id)
                .cloned()
                .collect();
            let changed = next.len() != inner.cards.len();
            if !changed {
                log::debug!("{} not present in {}", card_id, self.kind.title());
            }
            let next = Arc::new(next);

            self.persist(&next);
            inner.cards = next.clone();

            let listeners = if changed || self.policy == NotifyPolicy::Always {
                inner.observers.snapshot()
            } else {
                Vec::new()
            };
            (next, listeners)
        };

        for listener in &listeners {
            listener(&cards);
        }

        self.emit(Notice::success(self.kind.removed_message()))
    }

    /// Remove the card if present, add it otherwise
    pub fn toggle(&self, card: CardRecord) -> Result<Notice> {
        if self.contains(&card.id) {
            Ok(self.remove(&card.id))
        } else {
            self.add(card)
        }
    }

    pub fn contains(&self, card_id: &str) -> bool {
        self.lock().cards.iter().any(|c| c.id == card_id)
    }

    /// Current cards in insertion order
    pub fn snapshot(&self) -> Snapshot {
        self.lock().cards.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().cards.is_empty()
    }

    /// Register `listener` to receive the new snapshot after each notified
    /// mutation, in registration order.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Snapshot) + Send + Sync + 'static,
    {
        let id = self.lock().observers.subscribe(Arc::new(listener));
        log::debug!("New {} subscriber {:?}", self.kind.title(), id);
        Subscription {
            inner: Arc::downgrade(&self.inner),
            id,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().observers.len()
    }
}

#[cfg(test)]
#[path = "collection_tests.rs"]
mod tests;
