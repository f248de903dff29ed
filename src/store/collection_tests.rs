//! Tests for the shared collection store.

use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use super::{CollectionStore, Snapshot};
use crate::api::models::fixtures::card;
use crate::api::models::CardRecord;
use crate::error::TrackerError;
use crate::store::storage::{MemoryStorage, Storage};
use crate::store::{CollectionKind, NoticeLevel, NotifyPolicy};

fn wishlist() -> (CollectionStore, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    let store = CollectionStore::open(CollectionKind::Wishlist, storage.clone());
    (store, storage)
}

fn ids(cards: &[CardRecord]) -> Vec<&str> {
    cards.iter().map(|c| c.id.as_str()).collect()
}

fn stored_cards(storage: &MemoryStorage, kind: CollectionKind) -> Vec<CardRecord> {
    let content = storage.get(kind.storage_key()).unwrap().unwrap();
    serde_json::from_str(&content).unwrap()
}

/// Listener that records the length of every snapshot it receives
fn length_recorder(store: &CollectionStore) -> Arc<Mutex<Vec<usize>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let _ = store.subscribe(move |cards: &Snapshot| sink.lock().unwrap().push(cards.len()));
    seen
}

// ── add / contains / remove ──────────────────────────────────────────

#[test]
fn add_then_contains() {
    let (store, _storage) = wishlist();

    let notice = store.add(card("sv1-1", "Bulbasaur")).unwrap();

    assert!(store.contains("sv1-1"));
    assert_eq!(notice.level, NoticeLevel::Success);
    assert_eq!(notice.message, "Added to Chase List");
}

#[test]
fn remove_then_not_contains() {
    let (store, _storage) = wishlist();
    store.add(card("sv1-1", "Bulbasaur")).unwrap();

    store.remove("sv1-1");
    assert!(!store.contains("sv1-1"));

    // Also for an id that never existed
    store.remove("sv1-999");
    assert!(!store.contains("sv1-999"));
}

#[test]
fn insertion_order_is_preserved() {
    let (store, _storage) = wishlist();
    store.add(card("sv1-4", "Charmander")).unwrap();
    store.add(card("sv1-1", "Bulbasaur")).unwrap();
    store.add(card("sv1-7", "Squirtle")).unwrap();

    store.remove("sv1-1");
    store.add(card("sv1-1", "Bulbasaur")).unwrap();

    assert_eq!(ids(&store.snapshot()), vec!["sv1-4", "sv1-7", "sv1-1"]);
}

#[test]
fn duplicate_add_is_a_noop() {
    let (store, storage) = wishlist();
    store.add(card("sv1-1", "Bulbasaur")).unwrap();
    let writes = storage.write_count();

    let notice = store.add(card("sv1-1", "Bulbasaur")).unwrap();

    assert_eq!(notice.level, NoticeLevel::Info);
    assert_eq!(notice.message, "Card already in wishlist");
    assert_eq!(store.len(), 1);
    assert_eq!(storage.write_count(), writes, "duplicate add must not write");
}

#[test]
fn duplicate_id_with_different_fields_is_still_a_duplicate() {
    let (store, _storage) = wishlist();
    store.add(card("sv1-1", "Bulbasaur")).unwrap();

    let mut renamed = card("sv1-1", "Bulbasaur ex");
    renamed.rarity = Some("Double Rare".to_string());
    store.add(renamed).unwrap();

    let snapshot = store.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].name, "Bulbasaur");
}

#[test]
fn empty_id_is_rejected() {
    let (store, storage) = wishlist();

    let result = store.add(card("", "Nameless"));

    assert!(matches!(result, Err(TrackerError::EmptyCardId)));
    assert!(store.is_empty());
    assert_eq!(storage.write_count(), 0);
}

#[test]
fn remove_absent_still_writes_and_succeeds() {
    let (store, storage) = wishlist();
    store.add(card("sv1-1", "Bulbasaur")).unwrap();
    let writes = storage.write_count();

    let notice = store.remove("sv1-404");

    assert_eq!(notice.level, NoticeLevel::Success);
    assert_eq!(notice.message, "Removed from Chase List");
    assert_eq!(storage.write_count(), writes + 1);
    assert_eq!(ids(&stored_cards(&storage, CollectionKind::Wishlist)), vec!["sv1-1"]);
}

#[test]
fn toggle_adds_then_removes() {
    let (store, _storage) = wishlist();

    let added = store.toggle(card("sv1-1", "Bulbasaur")).unwrap();
    assert_eq!(added.message, "Added to Chase List");
    assert!(store.contains("sv1-1"));

    let removed = store.toggle(card("sv1-1", "Bulbasaur")).unwrap();
    assert_eq!(removed.message, "Removed from Chase List");
    assert!(!store.contains("sv1-1"));
}

// ── snapshots ────────────────────────────────────────────────────────

#[test]
fn earlier_snapshots_do_not_change() {
    let (store, _storage) = wishlist();
    store.add(card("sv1-1", "Bulbasaur")).unwrap();
    let before = store.snapshot();

    store.add(card("sv1-4", "Charmander")).unwrap();
    store.remove("sv1-1");

    assert_eq!(ids(&before), vec!["sv1-1"]);
    assert_eq!(ids(&store.snapshot()), vec!["sv1-4"]);
    assert!(!Arc::ptr_eq(&before, &store.snapshot()));
}

#[test]
fn duplicate_add_keeps_the_same_snapshot() {
    let (store, _storage) = wishlist();
    store.add(card("sv1-1", "Bulbasaur")).unwrap();
    let before = store.snapshot();

    store.add(card("sv1-1", "Bulbasaur")).unwrap();

    assert!(Arc::ptr_eq(&before, &store.snapshot()));
}

// ── persistence ──────────────────────────────────────────────────────

#[test]
fn every_change_is_persisted() {
    let (store, storage) = wishlist();
    store.add(card("sv1-1", "Bulbasaur")).unwrap();
    store.add(card("sv1-4", "Charmander")).unwrap();

    let stored = stored_cards(&storage, CollectionKind::Wishlist);
    assert_eq!(stored, *store.snapshot());

    store.remove("sv1-1");
    assert_eq!(ids(&stored_cards(&storage, CollectionKind::Wishlist)), vec!["sv1-4"]);
}

#[test]
fn hydrates_from_storage() {
    let seeded = vec![card("sv1-1", "Bulbasaur"), card("sv1-4", "Charmander")];
    let storage = Arc::new(MemoryStorage::new().with_value(
        CollectionKind::Owned.storage_key(),
        &serde_json::to_string(&seeded).unwrap(),
    ));

    let store = CollectionStore::open(CollectionKind::Owned, storage.clone());

    assert_eq!(*store.snapshot(), seeded);
    assert_eq!(storage.write_count(), 0, "opening must not write");
}

#[test]
fn corrupt_storage_starts_empty() {
    let storage = Arc::new(
        MemoryStorage::new().with_value(CollectionKind::Wishlist.storage_key(), "{not json"),
    );

    let store = CollectionStore::open(CollectionKind::Wishlist, storage);

    assert!(store.is_empty());
    store.add(card("sv1-1", "Bulbasaur")).unwrap();
    assert_eq!(store.len(), 1);
}

#[test]
fn wrong_shape_storage_starts_empty() {
    let storage = Arc::new(MemoryStorage::new().with_value(
        CollectionKind::Wishlist.storage_key(),
        r#"{"id": "sv1-1"}"#,
    ));

    let store = CollectionStore::open(CollectionKind::Wishlist, storage);

    assert!(store.is_empty());
}

#[test]
fn reopen_sees_previous_session() {
    let storage = Arc::new(MemoryStorage::new());
    {
        let store = CollectionStore::open(CollectionKind::Wishlist, storage.clone());
        store.add(card("sv1-1", "Bulbasaur")).unwrap();
    }

    let store = CollectionStore::open(CollectionKind::Wishlist, storage);
    assert!(store.contains("sv1-1"));
}

#[test]
fn collections_are_independent() {
    let storage: Arc<MemoryStorage> = Arc::new(MemoryStorage::new());
    let wishlist = CollectionStore::open(CollectionKind::Wishlist, storage.clone());
    let owned = CollectionStore::open(CollectionKind::Owned, storage.clone());

    wishlist.add(card("sv1-1", "Bulbasaur")).unwrap();
    owned.add(card("sv1-1", "Bulbasaur")).unwrap();
    owned.add(card("sv1-4", "Charmander")).unwrap();
    wishlist.remove("sv1-1");

    assert!(!wishlist.contains("sv1-1"));
    assert!(owned.contains("sv1-1"));
    assert_eq!(stored_cards(&storage, CollectionKind::Owned).len(), 2);
    assert!(stored_cards(&storage, CollectionKind::Wishlist).is_empty());
}

// ── subscriptions ────────────────────────────────────────────────────

#[test]
fn every_listener_runs_once_in_order_before_add_returns() {
    let (store, _storage) = wishlist();
    let calls = Arc::new(Mutex::new(Vec::new()));

    for tag in ["first", "second", "third"] {
        let calls = calls.clone();
        let _ = store.subscribe(move |cards: &Snapshot| {
            calls.lock().unwrap().push((tag, cards.len()));
        });
    }

    store.add(card("sv1-1", "Bulbasaur")).unwrap();

    assert_eq!(
        *calls.lock().unwrap(),
        vec![("first", 1), ("second", 1), ("third", 1)]
    );
}

#[test]
fn duplicate_add_does_not_notify() {
    let (store, _storage) = wishlist();
    store.add(card("sv1-1", "Bulbasaur")).unwrap();
    let seen = length_recorder(&store);

    store.add(card("sv1-1", "Bulbasaur")).unwrap();

    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn remove_of_absent_id_notifies_by_default() {
    let (store, _storage) = wishlist();
    let seen = length_recorder(&store);

    store.remove("sv1-404");

    assert_eq!(*seen.lock().unwrap(), vec![0]);
}

#[test]
fn on_change_policy_skips_noop_remove() {
    let storage = Arc::new(MemoryStorage::new());
    let store =
        CollectionStore::open(CollectionKind::Wishlist, storage).with_policy(NotifyPolicy::OnChange);
    let seen = length_recorder(&store);

    store.remove("sv1-404");
    store.add(card("sv1-1", "Bulbasaur")).unwrap();
    store.remove("sv1-1");

    assert_eq!(*seen.lock().unwrap(), vec![1, 0]);
}

#[test]
fn unsubscribed_listener_is_not_called() {
    let (store, _storage) = wishlist();
    let seen = Arc::new(Mutex::new(0));
    let sink = seen.clone();
    let subscription = store.subscribe(move |_: &Snapshot| *sink.lock().unwrap() += 1);

    store.add(card("sv1-1", "Bulbasaur")).unwrap();
    assert!(subscription.unsubscribe());
    store.remove("sv1-1");

    assert_eq!(*seen.lock().unwrap(), 1);
    assert_eq!(store.subscriber_count(), 0);
}

#[test]
fn unsubscribe_after_store_dropped() {
    let (store, _storage) = wishlist();
    let subscription = store.subscribe(|_: &Snapshot| {});
    drop(store);

    assert!(!subscription.unsubscribe());
}

#[test]
fn listener_can_read_the_store() {
    let storage = Arc::new(MemoryStorage::new());
    let store = Arc::new(CollectionStore::open(CollectionKind::Owned, storage));
    let observed = Arc::new(Mutex::new(Vec::new()));

    let reader = Arc::downgrade(&store);
    let sink = observed.clone();
    let _ = store.subscribe(move |_: &Snapshot| {
        if let Some(store) = reader.upgrade() {
            sink.lock().unwrap().push(store.contains("sv1-1"));
        }
    });

    store.add(card("sv1-1", "Bulbasaur")).unwrap();
    store.remove("sv1-1");

    assert_eq!(*observed.lock().unwrap(), vec![true, false]);
}

#[test]
fn listener_receives_the_new_snapshot() {
    let (store, _storage) = wishlist();
    let last = Arc::new(Mutex::new(None));
    let sink = last.clone();
    let _ = store.subscribe(move |cards: &Snapshot| *sink.lock().unwrap() = Some(cards.clone()));

    store.add(card("sv1-1", "Bulbasaur")).unwrap();

    let received = last.lock().unwrap().clone().unwrap();
    assert!(Arc::ptr_eq(&received, &store.snapshot()));
}

// ── threads ──────────────────────────────────────────────────────────

#[test]
fn parallel_adds_keep_ids_unique() {
    let storage = Arc::new(MemoryStorage::new());
    let store = Arc::new(CollectionStore::open(CollectionKind::Owned, storage.clone()));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = store.clone();
            thread::spawn(move || {
                store.add(card(&format!("sv1-{i}"), "Pikachu")).unwrap();
                store.add(card("sv1-shared", "Pikachu")).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let snapshot = store.snapshot();
    assert_eq!(snapshot.len(), 9);
    assert_eq!(snapshot.iter().filter(|c| c.id == "sv1-shared").count(), 1);
    assert_eq!(stored_cards(&storage, CollectionKind::Owned).len(), 9);
}

#[test]
fn notifications_follow_mutation_order_across_threads() {
    let storage = Arc::new(MemoryStorage::new());
    let store = Arc::new(CollectionStore::open(CollectionKind::Wishlist, storage));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let (entered_tx, entered_rx) = mpsc::channel();
    let entered_tx = Mutex::new(Some(entered_tx));

    // The first delivery stalls so a second writer can race it
    let sink = seen.clone();
    let _ = store.subscribe(move |cards: &Snapshot| {
        if let Some(tx) = entered_tx.lock().unwrap().take() {
            tx.send(()).unwrap();
            thread::sleep(Duration::from_millis(100));
        }
        sink.lock().unwrap().push(cards.len());
    });

    let first = {
        let store = store.clone();
        thread::spawn(move || store.add(card("sv1-1", "Bulbasaur")).unwrap())
    };
    entered_rx.recv().unwrap();
    let second = {
        let store = store.clone();
        thread::spawn(move || store.add(card("sv1-2", "Ivysaur")).unwrap())
    };
    first.join().unwrap();
    second.join().unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(*seen, vec![1, 2]);
    assert_eq!(seen.last().copied(), Some(store.len()));
}

// ── scenario ─────────────────────────────────────────────────────────

#[test]
fn wishlist_scenario() {
    let (store, _storage) = wishlist();
    assert!(store.is_empty());

    store.add(card("sv1-1", "Bulbasaur")).unwrap();
    let names: Vec<String> = store.snapshot().iter().map(|c| c.name.clone()).collect();
    assert_eq!(names, vec!["Bulbasaur"]);

    let notice = store.add(card("sv1-1", "Bulbasaur")).unwrap();
    assert_eq!(notice.level, NoticeLevel::Info);
    assert_eq!(store.len(), 1);

    store.remove("sv1-1");
    assert!(store.snapshot().is_empty());
}
